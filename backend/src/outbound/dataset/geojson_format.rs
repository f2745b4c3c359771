//! GeoJSON decoding into dataset features.

use std::collections::BTreeMap;

use geojson::{Feature, GeoJson};
use serde_json::Value;

use super::crs::from_geojson_crs;
use crate::domain::ports::{AttributeValue, DatasetFeature, RegionDataset, RegionDatasetSourceError};

/// Decode a GeoJSON document holding a feature collection or single feature.
pub(super) fn decode_geojson(bytes: &[u8]) -> Result<RegionDataset, RegionDatasetSourceError> {
    let text = std::str::from_utf8(bytes).map_err(|error| {
        RegionDatasetSourceError::decode(format!("GeoJSON is not UTF-8: {error}"))
    })?;
    let document = text.parse::<GeoJson>().map_err(|error| {
        RegionDatasetSourceError::decode(format!("invalid GeoJSON document: {error}"))
    })?;

    let (features, crs) = match document {
        GeoJson::FeatureCollection(collection) => {
            let crs = from_geojson_crs(
                collection
                    .foreign_members
                    .as_ref()
                    .and_then(|members| members.get("crs")),
            );
            (collection.features, crs)
        }
        GeoJson::Feature(feature) => (vec![feature], from_geojson_crs(None)),
        GeoJson::Geometry(_) => {
            return Err(RegionDatasetSourceError::unsupported(
                "bare GeoJSON geometry has no attributes",
            ));
        }
    };

    let mut columns: Vec<String> = Vec::new();
    let decoded = features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| decode_feature(index, feature, &mut columns))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RegionDataset {
        columns,
        crs,
        features: decoded,
        source_digest: String::new(),
    })
}

fn decode_feature(
    index: usize,
    feature: Feature,
    columns: &mut Vec<String>,
) -> Result<DatasetFeature, RegionDatasetSourceError> {
    let geometry = feature
        .geometry
        .map(geo::Geometry::<f64>::try_from)
        .transpose()
        .map_err(|error| {
            RegionDatasetSourceError::decode(format!("feature {index} geometry: {error}"))
        })?;

    let mut attributes = BTreeMap::new();
    for (name, value) in feature.properties.unwrap_or_default() {
        if !columns.contains(&name) {
            columns.push(name.clone());
        }
        attributes.insert(name, attribute_value(value));
    }
    Ok(DatasetFeature {
        attributes,
        geometry,
    })
}

fn attribute_value(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(flag) => AttributeValue::Boolean(flag),
        Value::Number(number) => number.as_i64().map_or_else(
            || number.as_f64().map_or(AttributeValue::Null, AttributeValue::Number),
            AttributeValue::Integer,
        ),
        Value::String(text) => AttributeValue::Text(text),
        other => AttributeValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::DeclaredCrs;
    use geo::Geometry;

    const COUNTIES: &str = r#"{
        "type": "FeatureCollection",
        "crs": { "type": "name", "properties": { "name": "EPSG:4269" } },
        "features": [
            {
                "type": "Feature",
                "properties": { "STATEFP": "06", "COUNTYFP": "037", "NAME": "Los Angeles", "ALAND": 10510651024 },
                "geometry": { "type": "Polygon", "coordinates": [[[-118.9, 33.7], [-117.6, 33.7], [-117.6, 34.8], [-118.9, 34.8], [-118.9, 33.7]]] }
            },
            {
                "type": "Feature",
                "properties": { "STATEFP": "48", "COUNTYFP": "201", "NAME": "Harris", "AWATER": null },
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn decodes_features_columns_and_crs() {
        let dataset = decode_geojson(COUNTIES.as_bytes()).expect("valid GeoJSON");

        assert_eq!(dataset.crs, DeclaredCrs::Epsg(4269));
        assert_eq!(dataset.features.len(), 2);
        for column in ["STATEFP", "COUNTYFP", "NAME", "ALAND", "AWATER"] {
            assert!(dataset.columns.iter().any(|name| name == column), "missing {column}");
        }

        let first = &dataset.features[0];
        assert_eq!(
            first.attributes.get("STATEFP"),
            Some(&AttributeValue::Text("06".to_owned()))
        );
        assert_eq!(
            first.attributes.get("ALAND"),
            Some(&AttributeValue::Integer(10_510_651_024))
        );
        assert!(matches!(first.geometry, Some(Geometry::Polygon(_))));

        let second = &dataset.features[1];
        assert_eq!(second.geometry, None);
        assert_eq!(second.attributes.get("AWATER"), Some(&AttributeValue::Null));
    }

    #[test]
    fn collections_without_crs_are_unspecified() {
        let dataset = decode_geojson(br#"{"type":"FeatureCollection","features":[]}"#)
            .expect("valid GeoJSON");
        assert_eq!(dataset.crs, DeclaredCrs::Unspecified);
        assert!(dataset.features.is_empty());
    }

    #[test]
    fn rejects_malformed_documents() {
        let error = decode_geojson(b"{\"type\":\"FeatureCollection\"").expect_err("truncated");
        assert!(matches!(error, RegionDatasetSourceError::Decode { .. }));
    }

    #[test]
    fn rejects_bare_geometries() {
        let error = decode_geojson(br#"{"type":"Point","coordinates":[1.0,2.0]}"#)
            .expect_err("no attributes");
        assert!(matches!(error, RegionDatasetSourceError::Unsupported { .. }));
    }
}
