//! Reference region loading service.
//!
//! Reading, projection, schema normalisation, and repair all complete before
//! the repository is asked to replace the table, so every failure ahead of
//! the replacement leaves stored regions untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::Error;
use crate::domain::ports::{
    AttributeValue, DatasetFeature, LoadStats, ReferenceLoadCommand, ReferenceLoadRequest,
    ReferenceRegion, ReferenceRegionRepository, RegionDataset, RegionDatasetSource,
};

mod columns;
mod mapping;
mod projection;
mod region_code;
mod repair;

pub use columns::ColumnMapping;
pub use projection::{ProjectionPlan, STORAGE_EPSG};
pub use region_code::{JURISDICTION_WIDTH, SUB_JURISDICTION_WIDTH, build_region_code};
pub use repair::{RepairedGeometry, into_multipolygon, repair};

static NULL_CELL: AttributeValue = AttributeValue::Null;

/// Domain service implementing the reference load command.
#[derive(Clone)]
pub struct ReferenceLoadService<S, R> {
    dataset_source: Arc<S>,
    region_repo: Arc<R>,
}

impl<S, R> ReferenceLoadService<S, R> {
    /// Create a new reference load service.
    pub fn new(dataset_source: Arc<S>, region_repo: Arc<R>) -> Self {
        Self {
            dataset_source,
            region_repo,
        }
    }
}

#[async_trait]
impl<S, R> ReferenceLoadCommand for ReferenceLoadService<S, R>
where
    S: RegionDatasetSource,
    R: ReferenceRegionRepository,
{
    async fn load(&self, request: ReferenceLoadRequest) -> Result<LoadStats, Error> {
        info!(path = %request.source_path.display(), "starting reference region load");
        let dataset = self
            .dataset_source
            .read_dataset(&request.source_path)
            .await
            .map_err(mapping::map_dataset_error)?;
        let source_digest = dataset.source_digest.clone();

        let normalised = tokio::task::spawn_blocking(move || normalise_dataset(dataset))
            .await
            .map_err(|err| Error::internal(format!("normalisation task failed: {err}")))??;

        let regions_loaded = self
            .region_repo
            .replace_regions(&normalised.regions)
            .await
            .map_err(mapping::map_repository_error)?;

        let stats = LoadStats {
            features_read: normalised.features_read,
            regions_loaded,
            geometries_repaired: normalised.geometries_repaired,
            source_epsg: normalised.source_epsg,
            reprojected: normalised.reprojected,
            source_digest,
        };
        info!(
            features_read = stats.features_read,
            regions_loaded = stats.regions_loaded,
            geometries_repaired = stats.geometries_repaired,
            reprojected = stats.reprojected,
            digest = %stats.source_digest,
            "reference region load completed"
        );
        Ok(stats)
    }
}

/// Regions ready for replacement plus the counters gathered on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalisedDataset {
    /// Regions in source order.
    pub regions: Vec<ReferenceRegion>,
    /// Features decoded from the source.
    pub features_read: u64,
    /// Geometries rebuilt by repair.
    pub geometries_repaired: u64,
    /// EPSG code declared by the source.
    pub source_epsg: Option<u16>,
    /// Whether coordinates were reprojected.
    pub reprojected: bool,
}

/// Normalise a decoded dataset into reference regions.
///
/// # Errors
///
/// Returns the first dataset, schema, projection, or geometry error found;
/// nothing is partially returned.
pub fn normalise_dataset(dataset: RegionDataset) -> Result<NormalisedDataset, Error> {
    if dataset.features.is_empty() {
        return Err(Error::dataset("reference dataset contains no features"));
    }
    let columns = ColumnMapping::resolve(&dataset.columns)?;
    let plan = ProjectionPlan::for_crs(&dataset.crs)?;
    let features_read = mapping::count(dataset.features.len())?;

    let mut seen = BTreeMap::new();
    let mut regions = Vec::with_capacity(dataset.features.len());
    let mut geometries_repaired = 0_u64;
    for (index, feature) in dataset.features.into_iter().enumerate() {
        let (region, repaired) = normalise_feature(index, feature, &columns, &plan)?;
        if let Some(first) = seen.insert(region.region_code.clone(), index) {
            return Err(Error::schema(format!(
                "duplicate region code {} in features {first} and {index}",
                region.region_code
            )));
        }
        if repaired {
            debug!(index, region_code = %region.region_code, "repaired invalid geometry");
            geometries_repaired += 1;
        }
        regions.push(region);
    }

    Ok(NormalisedDataset {
        regions,
        features_read,
        geometries_repaired,
        source_epsg: plan.source_epsg(),
        reprojected: plan.reprojects(),
    })
}

fn normalise_feature(
    index: usize,
    feature: DatasetFeature,
    columns: &ColumnMapping,
    plan: &ProjectionPlan,
) -> Result<(ReferenceRegion, bool), Error> {
    let DatasetFeature {
        attributes,
        geometry,
    } = feature;
    let cell = |column: &str| attributes.get(column).unwrap_or(&NULL_CELL);

    let (region_code, jurisdiction_code) =
        build_region_code(cell(&columns.jurisdiction), cell(&columns.sub_jurisdiction))
            .map_err(|err| Error::schema(format!("feature {index}: {}", err.message())))?;
    let region_name = render_name(cell(&columns.name)).ok_or_else(|| {
        Error::schema(format!("feature {index} ({region_code}) has no region name"))
    })?;

    let geometry = geometry.ok_or_else(|| {
        Error::schema(format!("feature {index} ({region_code}) has no geometry"))
    })?;
    let polygons = into_multipolygon(plan.apply(geometry)?).ok_or_else(|| {
        Error::schema(format!(
            "feature {index} ({region_code}) geometry is not polygonal"
        ))
    })?;
    let repaired = repair(polygons).map_err(|err| {
        Error::geometry(format!("feature {index} ({region_code}): {}", err.message()))
    })?;

    Ok((
        ReferenceRegion {
            region_code,
            jurisdiction_code,
            region_name,
            geometry: repaired.geometry,
        },
        repaired.repaired,
    ))
}

fn render_name(value: &AttributeValue) -> Option<String> {
    let name = match value {
        AttributeValue::Text(text) => text.trim().to_owned(),
        AttributeValue::Integer(number) => number.to_string(),
        AttributeValue::Number(number) => number.to_string(),
        AttributeValue::Boolean(_) | AttributeValue::Null => return None,
    };
    (!name.is_empty()).then_some(name)
}
