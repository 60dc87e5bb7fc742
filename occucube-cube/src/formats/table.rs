//! Typed in-memory delimited table
//!
//! Column types come from header names alone, following the conventions of
//! GBIF occurrence downloads: identifier columns ending in `Key` and calendar
//! fields are integers, coordinate-like columns are reals, the rest is text.

use std::collections::BTreeMap;

/// Key columns that hold dataset or organisation identifiers (UUIDs), not integers
const NON_INTEGER_KEYS: &[&str] = &[
    "datasetKey",
    "publishingOrgKey",
    "installationKey",
    "hostingOrganizationKey",
    "networkKey",
    "networkKeys",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn infer_from_header(name: &str) -> Self {
        let name = name.trim();
        if (name.ends_with("Key") && !NON_INTEGER_KEYS.contains(&name))
            || name.ends_with("DayOfYear")
            || matches!(name, "year" | "month" | "day")
        {
            ColumnType::Integer
        } else if name.starts_with("decimal")
            || name.starts_with("coordinate")
            || name == "pointRadiusSpatialFit"
        {
            ColumnType::Real
        } else {
            ColumnType::Text
        }
    }

    /// Parse one non-null field; `None` when it does not fit the type
    pub fn parse(self, raw: &str) -> Option<Value> {
        match self {
            ColumnType::Integer => raw.parse::<i64>().ok().map(Value::Int),
            ColumnType::Real => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Value::Real),
            ColumnType::Text => Some(Value::Text(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Reals, and integers widened to reals
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub types: Vec<ColumnType>,
    pub rows: Vec<Vec<Value>>,
    /// Per column, non-empty fields that failed to parse and were nulled
    pub invalid_cells: BTreeMap<String, usize>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        let types = columns.iter().map(|c| ColumnType::infer_from_header(c)).collect();
        Self {
            columns,
            types,
            rows: Vec::new(),
            invalid_cells: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column_index(name).map(|i| self.types[i])
    }

    pub fn value(&self, row: usize, column: usize) -> &Value {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&Value::Null)
    }

    pub fn invalid_total(&self) -> usize {
        self.invalid_cells.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_columns_are_integers() {
        for name in ["taxonKey", "acceptedTaxonKey", "speciesKey", "backboneTaxonKey", "key"] {
            let expected = if name == "key" { ColumnType::Text } else { ColumnType::Integer };
            assert_eq!(ColumnType::infer_from_header(name), expected, "{}", name);
        }
    }

    #[test]
    fn test_dataset_keys_stay_text() {
        for name in NON_INTEGER_KEYS {
            assert_eq!(ColumnType::infer_from_header(name), ColumnType::Text);
        }
    }

    #[test]
    fn test_calendar_and_real_columns() {
        assert_eq!(ColumnType::infer_from_header("year"), ColumnType::Integer);
        assert_eq!(ColumnType::infer_from_header("startDayOfYear"), ColumnType::Integer);
        assert_eq!(ColumnType::infer_from_header("decimalLatitude"), ColumnType::Real);
        assert_eq!(
            ColumnType::infer_from_header("coordinateUncertaintyInMeters"),
            ColumnType::Real
        );
        assert_eq!(ColumnType::infer_from_header("pointRadiusSpatialFit"), ColumnType::Real);
        assert_eq!(ColumnType::infer_from_header("eea_cell_code"), ColumnType::Text);
        assert_eq!(ColumnType::infer_from_header("yearly"), ColumnType::Text);
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(ColumnType::Integer.parse("42"), Some(Value::Int(42)));
        assert_eq!(ColumnType::Integer.parse("4.2"), None);
        assert_eq!(ColumnType::Real.parse("10"), Some(Value::Real(10.0)));
        assert_eq!(ColumnType::Real.parse("NaN"), None);
        assert_eq!(ColumnType::Text.parse("1kmE3900N3100"), Some(Value::Text("1kmE3900N3100".into())));
    }

    #[test]
    fn test_value_lookup_out_of_range_is_null() {
        let table = Table::new(vec!["year".into()]);
        assert!(table.value(3, 0).is_null());
        assert_eq!(table.column_type("year"), Some(ColumnType::Integer));
        assert_eq!(table.column_index("taxonKey"), None);
    }
}
