use std::fmt;

/// Radio band a series is tagged with, inferred from its frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Vhf,
    Uhf,
    Secure,
    Surveillance,
    Unknown,
}

/// Classification order. First inclusive range that contains the frequency wins.
const RANGES: [(Band, f64, f64); 4] = [
    (Band::Vhf, 30e6, 88e6),
    (Band::Uhf, 225e6, 400e6),
    (Band::Secure, 800e6, 900e6),
    (Band::Surveillance, 1.2e9, 1.3e9),
];

impl Band {
    pub fn label(self) -> &'static str {
        match self {
            Band::Vhf => "VHF",
            Band::Uhf => "UHF",
            Band::Secure => "Secure",
            Band::Surveillance => "Surveillance",
            Band::Unknown => "Unknown",
        }
    }

    /// Display color handed to the renderer as `line.color`.
    pub fn color(self) -> &'static str {
        match self {
            Band::Vhf => "blue",
            Band::Uhf => "red",
            Band::Secure => "green",
            Band::Surveillance => "purple",
            Band::Unknown => "gray",
        }
    }

    /// Inclusive `(low, high)` range in Hz; `None` for `Unknown`.
    pub fn range(self) -> Option<(f64, f64)> {
        RANGES
            .iter()
            .find(|(band, _, _)| *band == self)
            .map(|&(_, lo, hi)| (lo, hi))
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Map a frequency in Hz to its band. Missing or out-of-range frequencies are `Unknown`.
pub fn classify(frequency_hz: Option<f64>) -> Band {
    let Some(hz) = frequency_hz else {
        return Band::Unknown;
    };
    RANGES
        .iter()
        .find(|&&(_, lo, hi)| hz >= lo && hz <= hi)
        .map(|&(band, _, _)| band)
        .unwrap_or(Band::Unknown)
}

// ── Tests ──
