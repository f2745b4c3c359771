//! Construction of fixed-width composite region codes.

use crate::domain::Error;
use crate::domain::ports::AttributeValue;

/// Width of the jurisdiction portion of a region code.
pub const JURISDICTION_WIDTH: usize = 2;
/// Width of the sub-jurisdiction portion of a region code.
pub const SUB_JURISDICTION_WIDTH: usize = 3;

/// Build `(region_code, jurisdiction_code)` from raw attribute cells.
///
/// Numeric cells are rendered as integers before zero-padding, so both
/// `"6"` and `6.0` become `"06"`.
///
/// # Examples
/// ```
/// use risk_signals::domain::reference_load::build_region_code;
/// use risk_signals::domain::ports::AttributeValue;
///
/// let (region, jurisdiction) = build_region_code(
///     &AttributeValue::Text("6".into()),
///     &AttributeValue::Integer(37),
/// )
/// .expect("valid codes");
/// assert_eq!(region, "06037");
/// assert_eq!(jurisdiction, "06");
/// ```
///
/// # Errors
///
/// Returns a schema error when a cell is empty, non-numeric, negative, or
/// wider than its field.
pub fn build_region_code(
    jurisdiction: &AttributeValue,
    sub_jurisdiction: &AttributeValue,
) -> Result<(String, String), Error> {
    let jurisdiction_code = pad_code(jurisdiction, JURISDICTION_WIDTH)?;
    let sub_code = pad_code(sub_jurisdiction, SUB_JURISDICTION_WIDTH)?;
    Ok((format!("{jurisdiction_code}{sub_code}"), jurisdiction_code))
}

fn pad_code(value: &AttributeValue, width: usize) -> Result<String, Error> {
    let digits = render_digits(value).ok_or_else(|| {
        Error::schema(format!("code value {value:?} is not a non-negative integer"))
    })?;
    if digits.len() > width {
        return Err(Error::schema(format!(
            "code value {digits} exceeds {width} digits"
        )));
    }
    Ok(format!("{digits:0>width$}"))
}

fn render_digits(value: &AttributeValue) -> Option<String> {
    let rendered = match value {
        AttributeValue::Text(text) => text.trim().to_owned(),
        AttributeValue::Integer(number) if *number >= 0 => number.to_string(),
        AttributeValue::Number(number)
            if number.is_finite() && number.fract() == 0.0 && *number >= 0.0 =>
        {
            format!("{number:.0}")
        }
        _ => return None,
    };
    (!rendered.is_empty() && rendered.bytes().all(|byte| byte.is_ascii_digit()))
        .then_some(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn text(value: &str) -> AttributeValue {
        AttributeValue::Text(value.to_owned())
    }

    #[rstest]
    #[case::short_text(text("6"), text("37"), "06037", "06")]
    #[case::already_padded(text("06"), text("037"), "06037", "06")]
    #[case::integers(AttributeValue::Integer(48), AttributeValue::Integer(201), "48201", "48")]
    #[case::whole_floats(AttributeValue::Number(1.0), AttributeValue::Number(1.0), "01001", "01")]
    #[case::padded_whitespace(text(" 2 "), text(" 20"), "02020", "02")]
    fn builds_padded_codes(
        #[case] jurisdiction: AttributeValue,
        #[case] sub_jurisdiction: AttributeValue,
        #[case] expected_region: &str,
        #[case] expected_jurisdiction: &str,
    ) {
        let (region, jurisdiction) =
            build_region_code(&jurisdiction, &sub_jurisdiction).expect("valid codes");

        assert_eq!(region, expected_region);
        assert_eq!(jurisdiction, expected_jurisdiction);
        assert_eq!(region.len(), JURISDICTION_WIDTH + SUB_JURISDICTION_WIDTH);
    }

    #[rstest]
    #[case::too_wide(text("123"), text("1"))]
    #[case::sub_too_wide(text("1"), text("1234"))]
    #[case::letters(text("CA"), text("037"))]
    #[case::empty(text(""), text("037"))]
    #[case::null(AttributeValue::Null, text("037"))]
    #[case::negative(AttributeValue::Integer(-6), text("037"))]
    #[case::fractional(AttributeValue::Number(6.5), text("037"))]
    #[case::boolean(AttributeValue::Boolean(true), text("037"))]
    fn rejects_malformed_codes(
        #[case] jurisdiction: AttributeValue,
        #[case] sub_jurisdiction: AttributeValue,
    ) {
        let error = build_region_code(&jurisdiction, &sub_jurisdiction)
            .expect_err("malformed code should fail");
        assert_eq!(error.code(), ErrorCode::Schema);
    }
}
