//! Shapefile fixtures written through the shapefile and dbase writers.

use std::collections::HashMap;
use std::path::Path;

use shapefile::dbase::{FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing, Writer};

/// ESRI-style NAD83 projection sidecar with no root authority.
pub(super) const NAD83_PRJ: &str = r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

/// Write a one-county `.shp`/`.shx`/`.dbf` set at `shp_path`.
///
/// The county is a one-degree square with `STATEFP`, `COUNTYFP`, `NAME`, and
/// `ALAND` attributes.
pub(super) fn write_county_shapefile(shp_path: &Path) {
    let table = TableWriterBuilder::new()
        .add_character_field("STATEFP".try_into().expect("field name"), 2)
        .add_character_field("COUNTYFP".try_into().expect("field name"), 3)
        .add_character_field("NAME".try_into().expect("field name"), 40)
        .add_numeric_field("ALAND".try_into().expect("field name"), 12, 0);
    let writer = Writer::from_path(shp_path, table).expect("create shapefile");

    let county = Polygon::new(PolygonRing::Outer(vec![
        Point::new(-118.0, 34.0),
        Point::new(-118.0, 35.0),
        Point::new(-117.0, 35.0),
        Point::new(-117.0, 34.0),
        Point::new(-118.0, 34.0),
    ]));
    let record = Record::from(HashMap::from([
        text_field("STATEFP", "06"),
        text_field("COUNTYFP", "037"),
        text_field("NAME", "Los Angeles"),
        ("ALAND".to_owned(), FieldValue::Numeric(Some(1234.0))),
    ]));

    writer
        .write_shapes_and_records([(&county, &record)])
        .expect("write county");
}

fn text_field(name: &str, value: &str) -> (String, FieldValue) {
    (name.to_owned(), FieldValue::Character(Some(value.to_owned())))
}
