//! Resolution of source attribute columns onto the reference schema.

use crate::domain::Error;

const JURISDICTION_ALIASES: &[&str] = &["STATEFP", "STATEFP20", "STATEFP10"];
const SUB_JURISDICTION_ALIASES: &[&str] = &["COUNTYFP", "COUNTYFP20", "COUNTYFP10"];
const NAME_ALIASES: &[&str] = &["NAME", "NAMELSAD"];

/// Source column names chosen for each logical reference field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Column holding the two-digit jurisdiction code.
    pub jurisdiction: String,
    /// Column holding the three-digit sub-jurisdiction code.
    pub sub_jurisdiction: String,
    /// Column holding the display name.
    pub name: String,
}

impl ColumnMapping {
    /// Resolve every logical field against `columns`, case-insensitively.
    ///
    /// Aliases are tried in order and the first present column wins. The
    /// returned names keep the source spelling so attribute lookups match.
    ///
    /// # Errors
    ///
    /// Returns a schema error listing the columns found when any field has
    /// no matching column.
    pub fn resolve(columns: &[String]) -> Result<Self, Error> {
        let mut missing = Vec::new();
        let mut pick = |field: &str, aliases: &[&str]| {
            let found = find_column(columns, aliases);
            if found.is_none() {
                missing.push(format!("{field} ({})", aliases.join("|")));
            }
            found.unwrap_or_default()
        };
        let jurisdiction = pick("jurisdiction code", JURISDICTION_ALIASES);
        let sub_jurisdiction = pick("sub-jurisdiction code", SUB_JURISDICTION_ALIASES);
        let name = pick("region name", NAME_ALIASES);

        if !missing.is_empty() {
            return Err(Error::schema(format!(
                "unresolvable reference columns: {}; found: [{}]",
                missing.join(", "),
                columns.join(", ")
            )));
        }
        Ok(Self {
            jurisdiction,
            sub_jurisdiction,
            name,
        })
    }
}

fn find_column(columns: &[String], aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| {
        columns
            .iter()
            .find(|column| column.trim().eq_ignore_ascii_case(alias))
            .cloned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    #[rstest]
    fn resolves_current_vintage_columns() {
        let mapping = ColumnMapping::resolve(&columns(&["STATEFP", "COUNTYFP", "NAME", "GEOID"]))
            .expect("columns resolve");

        assert_eq!(mapping.jurisdiction, "STATEFP");
        assert_eq!(mapping.sub_jurisdiction, "COUNTYFP");
        assert_eq!(mapping.name, "NAME");
    }

    #[rstest]
    fn resolves_suffixed_columns_case_insensitively() {
        let mapping =
            ColumnMapping::resolve(&columns(&["statefp20", "CountyFP20", "namelsad"]))
                .expect("columns resolve");

        assert_eq!(mapping.jurisdiction, "statefp20");
        assert_eq!(mapping.sub_jurisdiction, "CountyFP20");
        assert_eq!(mapping.name, "namelsad");
    }

    #[rstest]
    fn earlier_aliases_take_precedence() {
        let mapping = ColumnMapping::resolve(&columns(&[
            "STATEFP10",
            "STATEFP",
            "COUNTYFP10",
            "NAMELSAD",
            "NAME",
        ]))
        .expect("columns resolve");

        assert_eq!(mapping.jurisdiction, "STATEFP");
        assert_eq!(mapping.sub_jurisdiction, "COUNTYFP10");
        assert_eq!(mapping.name, "NAME");
    }

    #[rstest]
    fn missing_columns_are_reported_with_those_found() {
        let error = ColumnMapping::resolve(&columns(&["STATEFP", "GEOID"]))
            .expect_err("county and name are missing");

        assert_eq!(error.code(), ErrorCode::Schema);
        assert!(error.message().contains("sub-jurisdiction code"));
        assert!(error.message().contains("region name"));
        assert!(error.message().contains("found: [STATEFP, GEOID]"));
    }
}
