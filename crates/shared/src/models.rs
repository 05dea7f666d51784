use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Accept any JSON value for a field and keep it only if it has the expected shape.
///
/// A single malformed measurement must not reject the whole heatmap document.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Keep the entries of `features` that are feature objects and drop the rest.
///
/// A `null` or non-array `features` value is an empty dataset.
fn lenient_features<'de, D>(deserializer: D) -> Result<Vec<Feature>, D::Error>
where
    D: Deserializer<'de>,
{
    let serde_json::Value::Array(entries) = serde_json::Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    let total = entries.len();
    let features: Vec<Feature> = entries
        .into_iter()
        .filter(serde_json::Value::is_object)
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    if features.len() < total {
        tracing::debug!(
            dropped = total - features.len(),
            "Skipping heatmap entries that are not feature objects"
        );
    }
    Ok(features)
}

/// A geographic position in WGS84 degrees, ordered the way map renderers expect it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_features")]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "lenient")]
    pub properties: Option<Properties>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// `[longitude, latitude]`, optionally followed by an altitude.
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    #[serde(default, deserialize_with = "lenient")]
    pub signal_dbm: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub carrier: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<i64>,
}

impl Feature {
    /// Build a point feature from `(lon, lat)` the way it is stored on disk.
    pub fn point(lon: f64, lat: f64, signal_dbm: f64, carrier: &str) -> Self {
        Feature {
            kind: Some("Feature".to_string()),
            geometry: Some(Geometry {
                kind: Some("Point".to_string()),
                coordinates: Some(vec![lon, lat]),
            }),
            properties: Some(Properties {
                signal_dbm: Some(signal_dbm),
                carrier: Some(carrier.to_string()),
                timestamp: None,
            }),
        }
    }

    /// Position with the stored `[lon, lat]` order swapped to `(lat, lng)`.
    ///
    /// `None` when the pair is missing, too short, or not finite.
    pub fn position(&self) -> Option<LatLng> {
        let coords = self.geometry.as_ref()?.coordinates.as_ref()?;
        if !(2..=3).contains(&coords.len()) {
            return None;
        }
        let (lon, lat) = (*coords.first()?, *coords.get(1)?);
        if lon.is_finite() && lat.is_finite() {
            Some(LatLng::new(lat, lon))
        } else {
            None
        }
    }

    pub fn signal_dbm(&self) -> Option<f64> {
        self.properties.as_ref()?.signal_dbm
    }

    pub fn carrier(&self) -> &str {
        self.properties
            .as_ref()
            .and_then(|p| p.carrier.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document_deserializes() {
        let json = r#"{ "features": [
            { "geometry": { "coordinates": [-43.9, -19.9] },
              "properties": { "signalDbm": -65, "carrier": "CarrierA" } }
        ] }"#;
        let fc: FeatureCollection = serde_json::from_str(json).unwrap();
        assert_eq!(fc.features.len(), 1);
        let f = &fc.features[0];
        assert_eq!(f.position(), Some(LatLng::new(-19.9, -43.9)));
        assert_eq!(f.signal_dbm(), Some(-65.0));
        assert_eq!(f.carrier(), "CarrierA");
    }

    #[test]
    fn test_missing_features_key_is_empty() {
        let fc: FeatureCollection =
            serde_json::from_str(r#"{"type":"FeatureCollection"}"#).unwrap();
        assert!(fc.features.is_empty());
        assert_eq!(fc.kind.as_deref(), Some("FeatureCollection"));
    }

    #[test]
    fn test_full_geojson_feature_with_timestamp() {
        let json = r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[-43.95,-19.92]},"properties":{"signalDbm":-91,"timestamp":1712000000,"carrier":"Vivo"}}"#;
        let f: Feature = serde_json::from_str(json).unwrap();
        assert_eq!(f.kind.as_deref(), Some("Feature"));
        assert_eq!(f.properties.as_ref().unwrap().timestamp, Some(1712000000));
        assert_eq!(f.carrier(), "Vivo");
    }

    #[test]
    fn test_malformed_fields_do_not_reject_document() {
        let json = r#"{"features":[
            {"geometry":{"coordinates":"nope"},"properties":{"signalDbm":"strong","carrier":7}},
            {"geometry":null,"properties":null},
            {}
        ]}"#;
        let fc: FeatureCollection = serde_json::from_str(json).unwrap();
        assert_eq!(fc.features.len(), 3);
        for f in &fc.features {
            assert!(f.position().is_none());
            assert!(f.signal_dbm().is_none());
            assert_eq!(f.carrier(), "");
        }
    }

    #[test]
    fn test_position_rejects_wrong_arity() {
        let mut f = Feature::point(-43.9, -19.9, -70.0, "A");
        f.geometry.as_mut().unwrap().coordinates = Some(vec![-43.9]);
        assert!(f.position().is_none());
        f.geometry.as_mut().unwrap().coordinates = Some(vec![1.0, 2.0, 3.0, 4.0]);
        assert!(f.position().is_none());
    }

    #[test]
    fn test_position_ignores_altitude() {
        let mut f = Feature::point(-43.9, -19.9, -70.0, "A");
        f.geometry.as_mut().unwrap().coordinates = Some(vec![-43.9, -19.9, 850.0]);
        assert_eq!(f.position(), Some(LatLng::new(-19.9, -43.9)));
    }

    #[test]
    fn test_non_object_entries_are_dropped() {
        let json = r#"{"features":[
            {"geometry":{"coordinates":[-43.9,-19.9]},"properties":{"signalDbm":-65,"carrier":"A"}},
            null,
            7,
            "Feature",
            [-43.9, -19.9],
            {"geometry":{"coordinates":[-43.8,-19.8]},"properties":{"signalDbm":-85,"carrier":"B"}}
        ]}"#;
        let fc: FeatureCollection = serde_json::from_str(json).unwrap();
        assert_eq!(fc.features.len(), 2);
        assert_eq!(fc.features[0].carrier(), "A");
        assert_eq!(fc.features[1].carrier(), "B");
    }

    #[test]
    fn test_null_features_is_empty() {
        let fc: FeatureCollection = serde_json::from_str(r#"{"features":null}"#).unwrap();
        assert!(fc.features.is_empty());
        let fc: FeatureCollection = serde_json::from_str(r#"{"features":{"a":1}}"#).unwrap();
        assert!(fc.features.is_empty());
    }
}
