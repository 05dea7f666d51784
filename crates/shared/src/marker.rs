use crate::models::{Feature, LatLng};
use crate::signal::SignalBand;

/// One renderable point: where it goes, how it is colored, and what its tooltip says.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: LatLng,
    pub band: SignalBand,
    pub tooltip: String,
}

impl Marker {
    /// `None` when the feature has no usable coordinate pair.
    pub fn from_feature(feature: &Feature) -> Option<Self> {
        let position = feature.position()?;
        let signal = feature.signal_dbm();
        Some(Marker {
            position,
            band: SignalBand::classify_reading(signal),
            tooltip: tooltip_text(feature.carrier(), signal),
        })
    }

    pub fn color(&self) -> &'static str {
        self.band.color()
    }
}

/// Tooltip text in the form `"<carrier> | <signalDbm> dBm"`.
///
/// Whole-number readings print without a fractional part (`-65`, not `-65.0`), and a
/// negative zero prints as `0`.
pub fn tooltip_text(carrier: &str, signal_dbm: Option<f64>) -> String {
    match signal_dbm {
        Some(dbm) => {
            let dbm = if dbm == 0.0 { 0.0 } else { dbm };
            format!("{} | {} dBm", carrier, dbm)
        }
        None => format!("{} | ? dBm", carrier),
    }
}

/// One marker per feature, in input order. Features without a position are skipped.
pub fn build_markers(features: &[Feature]) -> Vec<Marker> {
    features.iter().filter_map(Marker::from_feature).collect()
}

/// Number of markers per band, in `SignalBand::ALL` order.
pub fn band_counts(markers: &[Marker]) -> [usize; 3] {
    let mut counts = [0usize; 3];
    for marker in markers {
        let idx = match marker.band {
            SignalBand::Strong => 0,
            SignalBand::Medium => 1,
            SignalBand::Weak => 2,
        };
        if let Some(slot) = counts.get_mut(idx) {
            *slot += 1;
        }
    }
    counts
}
