//! Recognition of declared coordinate reference systems.
//!
//! Declarations are mapped to EPSG codes where possible; anything present
//! but unrecognisable is reported verbatim so the domain can refuse it.

use serde_json::Value;

use crate::domain::ports::DeclaredCrs;

const WGS84: u16 = 4326;
const NAD83: u16 = 4269;
const NAD27: u16 = 4267;
const WEB_MERCATOR: u16 = 3857;

/// Datum or coordinate system names that identify a CRS without an authority.
const WELL_KNOWN_NAMES: &[(&str, u16)] = &[
    ("WGS_1984_WEB_MERCATOR_AUXILIARY_SPHERE", WEB_MERCATOR),
    ("WGS_84_PSEUDO_MERCATOR", WEB_MERCATOR),
    ("NORTH_AMERICAN_DATUM_1983", NAD83),
    ("NORTH_AMERICAN_1983", NAD83),
    ("NAD83", NAD83),
    ("NORTH_AMERICAN_DATUM_1927", NAD27),
    ("NORTH_AMERICAN_1927", NAD27),
    ("NAD27", NAD27),
    ("WGS_1984", WGS84),
    ("WGS_84", WGS84),
];

/// Interpret the WKT text of a `.prj` sidecar.
pub(super) fn from_prj_wkt(wkt: &str) -> DeclaredCrs {
    let trimmed = wkt.trim();
    if trimmed.is_empty() {
        return DeclaredCrs::Unspecified;
    }
    if let Some(code) = root_epsg_authority(trimmed) {
        return DeclaredCrs::Epsg(code);
    }

    let normalised = trimmed.to_ascii_uppercase().replace([' ', '-'], "_");
    let projected = normalised.starts_with("PROJCS") || normalised.starts_with("PROJCRS");
    WELL_KNOWN_NAMES
        .iter()
        .filter(|(_, code)| !projected || *code == WEB_MERCATOR)
        .find(|(name, _)| normalised.contains(name))
        .map_or_else(
            || DeclaredCrs::Unrecognised(trimmed.to_owned()),
            |(_, code)| DeclaredCrs::Epsg(*code),
        )
}

/// Interpret the legacy `crs` member of a GeoJSON feature collection.
pub(super) fn from_geojson_crs(crs: Option<&Value>) -> DeclaredCrs {
    let Some(crs) = crs.filter(|value| !value.is_null()) else {
        return DeclaredCrs::Unspecified;
    };
    crs.get("properties")
        .and_then(|properties| properties.get("name"))
        .and_then(Value::as_str)
        .and_then(epsg_from_name)
        .map_or_else(
            || DeclaredCrs::Unrecognised(crs.to_string()),
            DeclaredCrs::Epsg,
        )
}

/// Resolve names such as `EPSG:4269`, `urn:ogc:def:crs:EPSG::3857`, or
/// `urn:ogc:def:crs:OGC:1.3:CRS84`.
fn epsg_from_name(name: &str) -> Option<u16> {
    let upper = name.trim().to_ascii_uppercase();
    if upper.ends_with("CRS84") {
        return Some(WGS84);
    }
    if !upper.contains("EPSG") {
        return None;
    }
    upper.rsplit(':').next()?.trim().parse().ok()
}

/// The EPSG authority attached directly to the root node.
///
/// Nested nodes (datum, prime meridian, unit) carry their own authorities,
/// which say nothing about the CRS itself.
fn root_epsg_authority(wkt: &str) -> Option<u16> {
    let upper = wkt.to_ascii_uppercase();
    let mut depth = 0_usize;
    let mut quoted = false;
    let mut found = None;
    for (index, ch) in upper.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            '[' | '(' if !quoted => {
                if depth == 1 && is_authority_keyword(upper.get(..index)?) {
                    found = parse_authority(upper.get(index + 1..)?).or(found);
                }
                depth += 1;
            }
            ']' | ')' if !quoted => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    found
}

fn is_authority_keyword(prefix: &str) -> bool {
    let keyword = prefix
        .trim_end()
        .rsplit(|ch: char| !ch.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    matches!(keyword, "AUTHORITY" | "ID")
}

fn parse_authority(body: &str) -> Option<u16> {
    let inner = body.split(']').next()?;
    let mut parts = inner.split(',').map(|part| part.trim().trim_matches('"'));
    if parts.next()? != "EPSG" {
        return None;
    }
    parts.next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    const NAD83_ESRI: &str = r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137,298.257222101]],PRIMEM["Greenwich",0],UNIT["Degree",0.017453292519943295]]"#;
    const MERCATOR_OGC: &str = r#"PROJCS["WGS 84 / Pseudo-Mercator",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],AUTHORITY["EPSG","4326"]],PROJECTION["Mercator_1SP"],UNIT["metre",1,AUTHORITY["EPSG","9001"]],AUTHORITY["EPSG","3857"]]"#;
    const NAD83_GDAL: &str = r#"GEOGCS["NAD83",DATUM["North_American_Datum_1983",SPHEROID["GRS 1980",6378137,298.257222101,AUTHORITY["EPSG","7019"]],AUTHORITY["EPSG","6269"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]]]"#;
    const UTM_NESTED_ONLY: &str = r#"PROJCS["NAD83 / UTM zone 11N",GEOGCS["NAD83",DATUM["North_American_Datum_1983",AUTHORITY["EPSG","6269"]],AUTHORITY["EPSG","4269"]],PROJECTION["Transverse_Mercator"],UNIT["metre",1,AUTHORITY["EPSG","9001"]]]"#;
    const LOCAL_UTM: &str = r#"PROJCS["NAD_1983_UTM_Zone_11N",GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137,298.257222101]]],PROJECTION["Transverse_Mercator"]]"#;

    #[rstest]
    #[case::esri_nad83(NAD83_ESRI, DeclaredCrs::Epsg(4269))]
    #[case::authority(MERCATOR_OGC, DeclaredCrs::Epsg(3857))]
    #[case::wkt2_id(r#"GEOGCRS["WGS 84",ID["EPSG",4326]]"#, DeclaredCrs::Epsg(4326))]
    #[case::gdal_nad83_without_root_authority(NAD83_GDAL, DeclaredCrs::Epsg(4269))]
    #[case::blank("  \n", DeclaredCrs::Unspecified)]
    fn recognises_prj_declarations(#[case] wkt: &str, #[case] expected: DeclaredCrs) {
        assert_eq!(from_prj_wkt(wkt), expected);
    }

    #[rstest]
    #[case::no_authority(LOCAL_UTM)]
    #[case::only_nested_authorities(UTM_NESTED_ONLY)]
    fn projected_wkt_without_root_authority_is_unrecognised(#[case] wkt: &str) {
        assert!(matches!(from_prj_wkt(wkt), DeclaredCrs::Unrecognised(_)));
    }

    fn named(name: &str) -> Option<Value> {
        Some(json!({"type": "name", "properties": {"name": name}}))
    }

    #[rstest]
    #[case::absent(None, DeclaredCrs::Unspecified)]
    #[case::urn(named("urn:ogc:def:crs:EPSG::3857"), DeclaredCrs::Epsg(3857))]
    #[case::short(named("EPSG:4269"), DeclaredCrs::Epsg(4269))]
    #[case::crs84(named("urn:ogc:def:crs:OGC:1.3:CRS84"), DeclaredCrs::Epsg(4326))]
    fn recognises_geojson_declarations(#[case] crs: Option<Value>, #[case] expected: DeclaredCrs) {
        assert_eq!(from_geojson_crs(crs.as_ref()), expected);
    }

    #[rstest]
    fn linked_geojson_crs_is_unrecognised() {
        let crs = json!({"type": "link", "properties": {"href": "http://example.test/crs"}});
        assert!(matches!(
            from_geojson_crs(Some(&crs)),
            DeclaredCrs::Unrecognised(_)
        ));
    }
}
