//! Polygon coercion and validity repair.

use geo::{Area, BooleanOps, Geometry, MultiPolygon, Polygon, Validation, unary_union};

use crate::domain::Error;

/// Geometry after validation, flagged when repair was required.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairedGeometry {
    /// Valid multipolygon.
    pub geometry: MultiPolygon<f64>,
    /// Whether the input was invalid and had to be rebuilt.
    pub repaired: bool,
}

/// Coerce a polygonal geometry into a multipolygon.
///
/// Returns `None` for any non-polygonal input.
pub fn into_multipolygon(geometry: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon])),
        Geometry::MultiPolygon(multi) => Some(multi),
        Geometry::GeometryCollection(collection) => collection
            .into_iter()
            .map(into_multipolygon)
            .try_fold(Vec::new(), |mut polygons, part| {
                polygons.extend(part?);
                Some(polygons)
            })
            .map(MultiPolygon::new),
        _ => None,
    }
}

/// Return `geometry` unchanged when sound; otherwise rebuild it.
///
/// A sound geometry is non-empty, passes OGC validation, and has no
/// zero-area parts, which PostGIS would reject even when the ring itself is
/// simple. Rebuilding fills each polygon by the even-odd rule, so both lobes
/// of a self-intersecting ring survive, then dissolves overlapping parts with
/// a unary union and drops zero-area remnants.
///
/// # Errors
///
/// Returns a geometry error when nothing with area remains or the rebuilt
/// shape is still invalid.
pub fn repair(geometry: MultiPolygon<f64>) -> Result<RepairedGeometry, Error> {
    if is_sound(&geometry) {
        return Ok(RepairedGeometry {
            geometry,
            repaired: false,
        });
    }

    let no_clip = MultiPolygon::<f64>::new(Vec::new());
    let filled = geometry
        .0
        .iter()
        .map(|polygon| polygon.union(&no_clip))
        .collect::<Vec<_>>();
    let rebuilt = MultiPolygon::new(
        unary_union(filled.iter())
            .0
            .into_iter()
            .filter(has_area)
            .collect(),
    );
    if rebuilt.0.is_empty() {
        return Err(Error::geometry("geometry has no area after repair"));
    }
    if !is_sound(&rebuilt) {
        return Err(Error::geometry("geometry remains invalid after repair"));
    }
    Ok(RepairedGeometry {
        geometry: rebuilt,
        repaired: true,
    })
}

fn has_area(polygon: &Polygon<f64>) -> bool {
    polygon.unsigned_area() > 0.0
}

fn is_sound(geometry: &MultiPolygon<f64>) -> bool {
    !geometry.0.is_empty() && geometry.0.iter().all(has_area) && geometry.is_valid()
}
