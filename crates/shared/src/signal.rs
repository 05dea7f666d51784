pub const STRONG_ABOVE_DBM: f64 = -70.0;
pub const MEDIUM_ABOVE_DBM: f64 = -80.0;

/// Severity band of a received signal strength reading.
///
/// Above -70 dBm is strong, above -80 dBm is medium, everything else is weak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalBand {
    Strong,
    Medium,
    Weak,
}

impl SignalBand {
    pub const ALL: [SignalBand; 3] = [SignalBand::Strong, SignalBand::Medium, SignalBand::Weak];

    /// Total over every `f64`: NaN fails both comparisons and lands in `Weak`.
    pub fn classify(signal_dbm: f64) -> Self {
        if signal_dbm > STRONG_ABOVE_DBM {
            SignalBand::Strong
        } else if signal_dbm > MEDIUM_ABOVE_DBM {
            SignalBand::Medium
        } else {
            SignalBand::Weak
        }
    }

    /// Missing or unparsable readings are treated as weak.
    pub fn classify_reading(signal_dbm: Option<f64>) -> Self {
        signal_dbm.map_or(SignalBand::Weak, Self::classify)
    }

    /// CSS color used for marker stroke and fill.
    pub fn color(self) -> &'static str {
        match self {
            SignalBand::Strong => "green",
            SignalBand::Medium => "orange",
            SignalBand::Weak => "red",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SignalBand::Strong => "strong",
            SignalBand::Medium => "medium",
            SignalBand::Weak => "weak",
        }
    }

    /// Human-readable threshold range, used by the legend.
    pub fn range_text(self) -> &'static str {
        match self {
            SignalBand::Strong => "> -70 dBm",
            SignalBand::Medium => "-80 to -70 dBm",
            SignalBand::Weak => "≤ -80 dBm",
        }
    }
}

impl std::fmt::Display for SignalBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
