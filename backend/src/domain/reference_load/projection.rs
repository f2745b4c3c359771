//! Normalisation of declared coordinate reference systems onto WGS84.

use crs_definitions::from_code;
use geo::{Coord, Geometry, MapCoords};
use proj4rs::Proj;
use proj4rs::transform::transform;

use crate::domain::Error;
use crate::domain::ports::DeclaredCrs;

/// EPSG code of the storage coordinate reference system.
pub const STORAGE_EPSG: u16 = 4326;

const WGS84_PROJ: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// How source coordinates reach WGS84 degrees.
pub struct ProjectionPlan {
    source_epsg: Option<u16>,
    transform: Option<Reprojection>,
}

struct Reprojection {
    source: Proj,
    target: Proj,
}

impl ProjectionPlan {
    /// Resolve the plan for a declared CRS.
    ///
    /// Undeclared sources are assumed to be WGS84 already and are not
    /// reprojected; so are sources declaring EPSG:4326.
    ///
    /// # Errors
    ///
    /// Returns a projection error for unrecognised declarations and for EPSG
    /// codes without a usable definition.
    pub fn for_crs(crs: &DeclaredCrs) -> Result<Self, Error> {
        match crs {
            DeclaredCrs::Unspecified => Ok(Self {
                source_epsg: None,
                transform: None,
            }),
            DeclaredCrs::Epsg(STORAGE_EPSG) => Ok(Self {
                source_epsg: Some(STORAGE_EPSG),
                transform: None,
            }),
            DeclaredCrs::Epsg(code) => Ok(Self {
                source_epsg: Some(*code),
                transform: Some(Reprojection::from_epsg(*code)?),
            }),
            DeclaredCrs::Unrecognised(raw) => Err(Error::projection(format!(
                "declared coordinate reference system is not recognised: {}",
                preview(raw)
            ))),
        }
    }

    /// EPSG code declared by the source, if any.
    pub fn source_epsg(&self) -> Option<u16> {
        self.source_epsg
    }

    /// Whether coordinates are transformed.
    pub fn reprojects(&self) -> bool {
        self.transform.is_some()
    }

    /// Bring `geometry` into WGS84 degrees.
    ///
    /// # Errors
    ///
    /// Returns a projection error when any coordinate fails to transform.
    pub fn apply(&self, geometry: Geometry<f64>) -> Result<Geometry<f64>, Error> {
        match &self.transform {
            None => Ok(geometry),
            Some(reprojection) => {
                geometry.try_map_coords(|coord| reprojection.project(coord))
            }
        }
    }
}

impl Reprojection {
    fn from_epsg(code: u16) -> Result<Self, Error> {
        let definition = from_code(code).ok_or_else(|| {
            Error::projection(format!("no projection definition for EPSG:{code}"))
        })?;
        let source = Proj::from_proj_string(definition.proj4).map_err(|err| {
            Error::projection(format!("unusable definition for EPSG:{code}: {err}"))
        })?;
        let target = Proj::from_proj_string(WGS84_PROJ)
            .map_err(|err| Error::projection(format!("unusable WGS84 definition: {err}")))?;
        Ok(Self { source, target })
    }

    fn project(&self, coord: Coord<f64>) -> Result<Coord<f64>, Error> {
        let mut point = if self.source.is_latlong() {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };
        transform(&self.source, &self.target, &mut point).map_err(|err| {
            Error::projection(format!("failed to reproject ({}, {}): {err}", coord.x, coord.y))
        })?;
        let projected = Coord {
            x: point.0.to_degrees(),
            y: point.1.to_degrees(),
        };
        if !(projected.x.is_finite() && projected.y.is_finite()) {
            return Err(Error::projection(format!(
                "reprojection of ({}, {}) produced non-finite coordinates",
                coord.x, coord.y
            )));
        }
        Ok(projected)
    }
}

fn preview(raw: &str) -> String {
    const LIMIT: usize = 80;
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= LIMIT {
        return collapsed;
    }
    let truncated: String = collapsed.chars().take(LIMIT).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use geo::{Point, point};
    use rstest::rstest;

    const TOLERANCE: f64 = 1e-6;

    fn project_point(plan: &ProjectionPlan, x: f64, y: f64) -> Point<f64> {
        match plan
            .apply(Geometry::Point(point!(x: x, y: y)))
            .expect("projection succeeds")
        {
            Geometry::Point(projected) => projected,
            other => panic!("expected point, got {other:?}"),
        }
    }

    #[rstest]
    fn undeclared_sources_pass_through_untouched() {
        let plan = ProjectionPlan::for_crs(&DeclaredCrs::Unspecified).expect("plan");

        assert!(!plan.reprojects());
        assert_eq!(plan.source_epsg(), None);
        assert_eq!(project_point(&plan, -122.4, 37.8), point!(x: -122.4, y: 37.8));
    }

    #[rstest]
    fn wgs84_sources_are_not_reprojected() {
        let plan = ProjectionPlan::for_crs(&DeclaredCrs::Epsg(4326)).expect("plan");

        assert!(!plan.reprojects());
        assert_eq!(plan.source_epsg(), Some(4326));
    }

    #[rstest]
    #[case::false_easting_on_meridian(500_000.0, 0.0, 15.0, 0.0)]
    fn projected_sources_are_converted_to_degrees(
        #[case] x: f64,
        #[case] y: f64,
        #[case] expected_lon: f64,
        #[case] expected_lat: f64,
    ) {
        let plan = ProjectionPlan::for_crs(&DeclaredCrs::Epsg(32633)).expect("UTM 33N plan");
        let projected = project_point(&plan, x, y);

        assert!(plan.reprojects());
        assert!((projected.x() - expected_lon).abs() < TOLERANCE);
        assert!((projected.y() - expected_lat).abs() < TOLERANCE);
    }

    #[rstest]
    fn geographic_sources_round_trip_through_radians() {
        let plan = ProjectionPlan::for_crs(&DeclaredCrs::Epsg(4269)).expect("NAD83 plan");
        let projected = project_point(&plan, -118.25, 34.05);

        assert!(plan.reprojects());
        assert!((projected.x() - -118.25).abs() < TOLERANCE);
        assert!((projected.y() - 34.05).abs() < TOLERANCE);
    }

    #[rstest]
    #[case::unrecognised(DeclaredCrs::Unrecognised("LOCAL_CS[\"site grid\"]".to_owned()))]
    #[case::unknown_code(DeclaredCrs::Epsg(1))]
    fn unusable_declarations_are_projection_errors(#[case] crs: DeclaredCrs) {
        let error = ProjectionPlan::for_crs(&crs)
            .err()
            .expect("declaration should be rejected");
        assert_eq!(error.code(), ErrorCode::Projection);
    }
}
