//! ESRI shapefile decoding into dataset features.

use std::collections::BTreeMap;
use std::path::Path;

use shapefile::dbase::{self, FieldValue};
use shapefile::{Reader, Shape};

use super::crs::from_prj_wkt;
use crate::domain::ports::{
    AttributeValue, DatasetFeature, DeclaredCrs, RegionDataset, RegionDatasetSourceError,
};

/// Decode the `.shp`/`.dbf` pair at `shp_path`, honouring an optional `.prj`.
pub(super) fn decode_shapefile(shp_path: &Path) -> Result<RegionDataset, RegionDatasetSourceError> {
    let dbf_path = shp_path.with_extension("dbf");
    if !dbf_path.is_file() {
        return Err(RegionDatasetSourceError::decode(format!(
            "shapefile attribute table missing: {}",
            dbf_path.display()
        )));
    }
    let columns = dbase::Reader::from_path(&dbf_path)
        .map_err(|error| {
            RegionDatasetSourceError::decode(format!("invalid attribute table: {error}"))
        })?
        .fields()
        .iter()
        .map(|field| field.name().to_owned())
        .collect();

    let mut reader = Reader::from_path(shp_path).map_err(|error| {
        RegionDatasetSourceError::decode(format!("invalid shapefile: {error}"))
    })?;
    let features = reader
        .iter_shapes_and_records()
        .enumerate()
        .map(|(index, entry)| {
            let (shape, record) = entry.map_err(|error| {
                RegionDatasetSourceError::decode(format!("shapefile record {index}: {error}"))
            })?;
            Ok(DatasetFeature {
                attributes: record
                    .into_iter()
                    .map(|(name, value)| (name, attribute_value(value)))
                    .collect::<BTreeMap<_, _>>(),
                geometry: shape_geometry(index, shape)?,
            })
        })
        .collect::<Result<Vec<_>, RegionDatasetSourceError>>()?;

    Ok(RegionDataset {
        columns,
        crs: read_prj(shp_path)?,
        features,
        source_digest: String::new(),
    })
}

fn read_prj(shp_path: &Path) -> Result<DeclaredCrs, RegionDatasetSourceError> {
    let prj_path = shp_path.with_extension("prj");
    if !prj_path.is_file() {
        return Ok(DeclaredCrs::Unspecified);
    }
    let wkt = std::fs::read_to_string(&prj_path).map_err(|error| {
        RegionDatasetSourceError::read(format!("read {}: {error}", prj_path.display()))
    })?;
    Ok(from_prj_wkt(&wkt))
}

fn shape_geometry(
    index: usize,
    shape: Shape,
) -> Result<Option<geo::Geometry<f64>>, RegionDatasetSourceError> {
    if matches!(shape, Shape::NullShape) {
        return Ok(None);
    }
    geo::Geometry::<f64>::try_from(shape)
        .map(Some)
        .map_err(|error| {
            RegionDatasetSourceError::decode(format!(
                "shapefile record {index} geometry: {error:?}"
            ))
        })
}

fn attribute_value(value: FieldValue) -> AttributeValue {
    match value {
        FieldValue::Character(Some(text)) | FieldValue::Memo(text) => {
            AttributeValue::Text(text.trim().to_owned())
        }
        FieldValue::Numeric(Some(number))
        | FieldValue::Double(number)
        | FieldValue::Currency(number) => AttributeValue::Number(number),
        FieldValue::Float(Some(number)) => AttributeValue::Number(f64::from(number)),
        FieldValue::Integer(number) => AttributeValue::Integer(i64::from(number)),
        FieldValue::Logical(Some(flag)) => AttributeValue::Boolean(flag),
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None) => AttributeValue::Null,
        other => AttributeValue::Text(format!("{other:?}")),
    }
}
