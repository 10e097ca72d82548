/// One link in the document index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub label: String,
    pub target: String,
}

/// What the index region shows. An empty manifest is explicit, never a blank region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexView {
    Links(Vec<IndexEntry>),
    Empty,
}

impl IndexView {
    pub const EMPTY_MESSAGE: &'static str = "No timeline documents listed.";
}

pub fn render_index(documents: &[String]) -> IndexView {
    if documents.is_empty() {
        return IndexView::Empty;
    }
    IndexView::Links(
        documents
            .iter()
            .map(|doc| IndexEntry {
                label: display_label(doc).to_string(),
                target: doc.clone(),
            })
            .collect(),
    )
}

/// Last path segment of a reference, without query or fragment
/// (`a/b/scan.html?v=2` → `scan.html`).
pub fn display_label(reference: &str) -> &str {
    let path = reference.split(['?', '#']).next().unwrap_or(reference);
    path.rsplit('/').next().unwrap_or(path)
}

// ── Tests ──
