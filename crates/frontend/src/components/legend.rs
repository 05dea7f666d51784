use dioxus::prelude::*;
use heatmap_shared::signal::SignalBand;

/// Band key plus a point-count readout, pinned over the map.
#[component]
pub fn Legend(counts: [usize; 3], total: usize) -> Element {
    let rows: Vec<(&'static str, &'static str, &'static str, usize)> = SignalBand::ALL
        .into_iter()
        .zip(counts)
        .map(|(band, count)| (band.color(), band.label(), band.range_text(), count))
        .collect();

    rsx! {
        div { class: "legend",
            div { class: "legend-total", "{total} signal points" }
            for (color, label, range, count) in rows {
                div { class: "legend-row",
                    span {
                        class: "legend-swatch",
                        style: "background:{color};border-color:{color};",
                    }
                    span { class: "legend-label", "{label}" }
                    span { class: "legend-range", "{range}" }
                    span { class: "legend-count", "{count}" }
                }
            }
        }
    }
}
