use std::future::Future;

use dioxus::prelude::*;
use heatmap_shared::models::{Feature, FeatureCollection};

use crate::api::{self, CancelToken, LoadError};
use crate::components::map_view::MapView;

/// Run `load` once for the lifetime of the calling component and replace `features` with
/// its result. Later renders ignore `load`; a result finishing after unmount is dropped.
pub fn use_feature_load<F, Fut>(mut features: Signal<Vec<Feature>>, load: F)
where
    F: FnOnce() -> Fut + 'static,
    Fut: Future<Output = Result<FeatureCollection, LoadError>> + 'static,
{
    let cancel = use_hook(CancelToken::new);
    use_drop({
        let cancel = cancel.clone();
        move || cancel.cancel()
    });

    use_hook(move || {
        spawn(async move {
            let result = load().await;
            if let Some(loaded) = api::settle(result, &cancel) {
                features.set(loaded);
            }
        })
    });
}

#[component]
pub fn HeatmapView() -> Element {
    // View state: replaced wholesale when the load completes, never edited in place.
    let features = use_signal(Vec::<Feature>::new);

    use_feature_load(features, || async move {
        let url = api::heatmap_url();
        api::fetch_features(&url).await
    });

    rsx! {
        div { class: "app",
            MapView { features: features }
        }
    }
}
