//! Per-record validation of raw feed features.
//!
//! Parsing is total: every input yields either a [`ParsedFeature::Valid`]
//! row or a [`ParsedFeature::Rejected`] reason, so one malformed record can
//! never abort a batch.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::ports::EventRow;

/// Why a feature was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// `id` is absent, null, or blank.
    MissingId,
    /// `properties.time` is absent or null.
    MissingTime,
    /// `properties.time` is not an integral millisecond count in range.
    InvalidTime,
    /// Longitude or latitude is absent.
    MissingCoordinates,
    /// Longitude or latitude is non-numeric, non-finite, or out of range.
    InvalidCoordinates,
}

impl RejectionReason {
    /// Stable label used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingId => "missing_id",
            Self::MissingTime => "missing_time",
            Self::InvalidTime => "invalid_time",
            Self::MissingCoordinates => "missing_coordinates",
            Self::InvalidCoordinates => "invalid_coordinates",
        }
    }
}

/// Outcome of parsing one raw feature.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedFeature {
    /// The feature produced a row.
    Valid(EventRow),
    /// The feature was rejected and must not reach storage.
    Rejected(RejectionReason),
}

/// Convert a millisecond epoch timestamp into UTC, keeping sub-second digits.
///
/// # Examples
/// ```
/// use risk_signals::domain::millis_to_utc;
///
/// let observed = millis_to_utc(1_700_000_000_000).expect("in range");
/// assert_eq!(observed.to_rfc3339(), "2023-11-14T22:13:20+00:00");
/// ```
pub fn millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Parse one GeoJSON feature from the event feed.
///
/// Only `id`, `properties.time`, and the first two coordinates are required;
/// magnitude, place, and depth pass through as `None` when absent.
pub fn parse_feature(feature: &Value) -> ParsedFeature {
    match parse_row(feature) {
        Ok(row) => ParsedFeature::Valid(row),
        Err(reason) => ParsedFeature::Rejected(reason),
    }
}

fn parse_row(feature: &Value) -> Result<EventRow, RejectionReason> {
    let event_id = parse_event_id(feature.get("id"))?;
    let properties = feature.get("properties");
    let observed_at = parse_time(properties.and_then(|props| props.get("time")))?;
    let coordinates = feature
        .get("geometry")
        .and_then(|geometry| geometry.get("coordinates"))
        .and_then(Value::as_array)
        .ok_or(RejectionReason::MissingCoordinates)?;
    let (longitude, latitude) = parse_position(coordinates)?;
    let depth = coordinates
        .get(2)
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite());

    Ok(EventRow {
        event_id,
        observed_at,
        magnitude: properties
            .and_then(|props| props.get("mag"))
            .and_then(Value::as_f64)
            .filter(|value| value.is_finite()),
        description: properties
            .and_then(|props| props.get("place"))
            .and_then(Value::as_str)
            .map(str::to_owned),
        longitude,
        latitude,
        depth,
        raw_payload: feature.clone(),
    })
}

fn parse_event_id(value: Option<&Value>) -> Result<String, RejectionReason> {
    let id = match value {
        Some(Value::String(id)) => id.trim().to_owned(),
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    };
    if id.is_empty() {
        return Err(RejectionReason::MissingId);
    }
    Ok(id)
}

fn parse_time(value: Option<&Value>) -> Result<DateTime<Utc>, RejectionReason> {
    let value = value
        .filter(|value| !value.is_null())
        .ok_or(RejectionReason::MissingTime)?;
    let millis = match value.as_i64() {
        Some(millis) => millis,
        None => integral_millis(value.as_f64()).ok_or(RejectionReason::InvalidTime)?,
    };
    millis_to_utc(millis).ok_or(RejectionReason::InvalidTime)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "value is integral and bounded to the i64 range before casting"
)]
fn integral_millis(value: Option<f64>) -> Option<i64> {
    const I64_BOUND: f64 = 9.223_372_036_854_775e18;
    value
        .filter(|millis| millis.is_finite() && millis.fract() == 0.0)
        .filter(|millis| millis.abs() < I64_BOUND)
        .map(|millis| millis as i64)
}

fn parse_position(coordinates: &[Value]) -> Result<(f64, f64), RejectionReason> {
    let longitude = coordinate(coordinates.first())?;
    let latitude = coordinate(coordinates.get(1))?;
    if !(valid_longitude(longitude) && valid_latitude(latitude)) {
        return Err(RejectionReason::InvalidCoordinates);
    }
    Ok((longitude, latitude))
}

fn coordinate(value: Option<&Value>) -> Result<f64, RejectionReason> {
    match value {
        None | Some(Value::Null) => Err(RejectionReason::MissingCoordinates),
        Some(value) => value.as_f64().ok_or(RejectionReason::InvalidCoordinates),
    }
}

fn valid_longitude(value: f64) -> bool {
    value.is_finite() && (-180.0..=180.0).contains(&value)
}

fn valid_latitude(value: f64) -> bool {
    value.is_finite() && (-90.0..=90.0).contains(&value)
}

#[cfg(test)]
mod tests {
    //! Unit coverage for feature validation and timestamp conversion.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    const EPOCH_MILLIS: i64 = 1_700_000_000_000;

    fn feature(id: Value, time: Value, coordinates: Value) -> Value {
        json!({
            "type": "Feature",
            "id": id,
            "properties": { "time": time, "mag": 4.6, "place": "12 km SSW of Volcano, Hawaii" },
            "geometry": { "type": "Point", "coordinates": coordinates },
        })
    }

    fn timed(id: Value, coordinates: Value) -> Value {
        feature(id, json!(EPOCH_MILLIS), coordinates)
    }

    fn valid_row(parsed: ParsedFeature) -> EventRow {
        match parsed {
            ParsedFeature::Valid(row) => row,
            ParsedFeature::Rejected(reason) => panic!("expected valid row, got {reason:?}"),
        }
    }

    #[rstest]
    fn converts_epoch_millis_to_utc() {
        let observed = millis_to_utc(1_700_000_000_000).expect("in range");
        assert_eq!(
            observed.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "2023-11-14T22:13:20Z"
        );
    }

    #[rstest]
    fn preserves_sub_second_precision() {
        let observed = millis_to_utc(1_700_000_000_123).expect("in range");
        assert_eq!(observed.timestamp_subsec_millis(), 123);
    }

    #[rstest]
    fn parses_complete_feature() {
        let raw = timed(json!("hv74103036"), json!([-155.28, 19.41, 2.5]));
        let row = valid_row(parse_feature(&raw));

        assert_eq!(row.event_id, "hv74103036");
        assert_eq!(row.magnitude, Some(4.6));
        assert_eq!(row.description.as_deref(), Some("12 km SSW of Volcano, Hawaii"));
        assert_eq!(row.longitude, -155.28);
        assert_eq!(row.latitude, 19.41);
        assert_eq!(row.depth, Some(2.5));
        assert_eq!(row.raw_payload, raw);
    }

    #[rstest]
    fn optional_fields_pass_through_as_none() {
        let raw = json!({
            "id": "ak0001",
            "properties": { "time": 1_700_000_000_000_i64, "mag": null },
            "geometry": { "coordinates": [-150.0, 61.0] },
        });
        let row = valid_row(parse_feature(&raw));

        assert_eq!(row.magnitude, None);
        assert_eq!(row.description, None);
        assert_eq!(row.depth, None);
    }

    #[rstest]
    fn accepts_integral_float_timestamps() {
        let raw = feature(json!("us1"), json!(1.7e12), json!([10.0, 20.0]));
        let row = valid_row(parse_feature(&raw));
        assert_eq!(row.observed_at.timestamp_millis(), 1_700_000_000_000);
    }

    #[rstest]
    #[case::missing_id(
        timed(Value::Null, json!([1.0, 2.0])),
        RejectionReason::MissingId
    )]
    #[case::blank_id(
        timed(json!("  "), json!([1.0, 2.0])),
        RejectionReason::MissingId
    )]
    #[case::missing_time(
        feature(json!("a"), Value::Null, json!([1.0, 2.0])),
        RejectionReason::MissingTime
    )]
    #[case::textual_time(
        feature(json!("a"), json!("yesterday"), json!([1.0, 2.0])),
        RejectionReason::InvalidTime
    )]
    #[case::fractional_time(
        feature(json!("a"), json!(1.5), json!([1.0, 2.0])),
        RejectionReason::InvalidTime
    )]
    #[case::no_coordinates(
        timed(json!("a"), Value::Null),
        RejectionReason::MissingCoordinates
    )]
    #[case::missing_latitude(
        timed(json!("a"), json!([1.0])),
        RejectionReason::MissingCoordinates
    )]
    #[case::null_longitude(
        timed(json!("a"), json!([null, 2.0])),
        RejectionReason::MissingCoordinates
    )]
    #[case::textual_latitude(
        timed(json!("a"), json!([1.0, "north"])),
        RejectionReason::InvalidCoordinates
    )]
    #[case::latitude_out_of_range(
        timed(json!("a"), json!([1.0, 91.0])),
        RejectionReason::InvalidCoordinates
    )]
    #[case::longitude_out_of_range(
        timed(json!("a"), json!([-180.5, 2.0])),
        RejectionReason::InvalidCoordinates
    )]
    fn rejects_features_missing_required_fields(
        #[case] raw: Value,
        #[case] expected: RejectionReason,
    ) {
        assert_eq!(parse_feature(&raw), ParsedFeature::Rejected(expected));
    }

    #[rstest]
    fn rejects_feature_without_properties() {
        let raw = json!({ "id": "a", "geometry": { "coordinates": [1.0, 2.0] } });
        assert_eq!(
            parse_feature(&raw),
            ParsedFeature::Rejected(RejectionReason::MissingTime)
        );
    }

    #[rstest]
    fn numeric_identifiers_are_rendered_as_text() {
        let raw = timed(json!(42), json!([1.0, 2.0]));
        assert_eq!(valid_row(parse_feature(&raw)).event_id, "42");
    }

    #[rstest]
    fn non_object_input_is_rejected_not_panicking() {
        assert_eq!(
            parse_feature(&json!([1, 2, 3])),
            ParsedFeature::Rejected(RejectionReason::MissingId)
        );
    }
}
