//! Ingestion (ties into C1/C2) — turns caller-supplied records into the
//! typed [`crate::row::Row`]s the engine operates on.
//!
//! Input is column-name-addressed rather than a fixed struct, the same
//! shape `serde_json::Value` records have in the teacher's `cdc.rs`
//! decoder: a publisher's dimension list is configuration, not a compile
//! time type, so the row shape has to be discovered from `Config` at
//! ingestion time rather than baked into a struct definition.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::PopulationLookup;
use crate::config::Config;
use crate::dim::{DimKey, DimValue};
use crate::error::SuppressionError;
use crate::row::{Row, RowStore};

/// One column value as supplied by the caller, before it's been sorted
/// into a dimension, the incidence count, or an auxiliary population
/// value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl InputValue {
    fn as_dim_value(&self) -> DimValue {
        match self {
            InputValue::Null => DimValue::Null,
            InputValue::Integer(n) => DimValue::Text(n.to_string()),
            InputValue::Float(f) => DimValue::Text(f.to_string()),
            InputValue::Text(s) => DimValue::Text(s.clone()),
        }
    }

    fn as_incidence(&self) -> Option<u64> {
        match self {
            InputValue::Integer(n) if *n >= 0 => Some(*n as u64),
            InputValue::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Some(*f as u64),
            _ => None,
        }
    }

    fn as_population(&self) -> Option<f64> {
        match self {
            InputValue::Integer(n) => Some(*n as f64),
            InputValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// One record as handed to [`crate::suppress`]: a flat map from column
/// name to value. Columns not named as a dimension, the incidence column,
/// or the population column are ignored — the engine has no notion of
/// passthrough columns beyond what it needs to classify and suppress.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputRow {
    pub columns: BTreeMap<String, InputValue>,
}

impl InputRow {
    pub fn new() -> Self {
        InputRow::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: InputValue) -> &mut Self {
        self.columns.insert(column.into(), value);
        self
    }
}

/// Ingest `rows` into a fresh [`RowStore`] and [`PopulationLookup`] per
/// `config`, or the first [`SuppressionError::MalformedInput`] found.
///
/// Validation order matches spec §7: a missing or non-integer incidence
/// fails before duplicate-tuple detection gets a chance to mask it, since
/// a caller debugging "why did my import fail" needs the more specific
/// error first.
pub fn ingest(
    rows: Vec<InputRow>,
    config: &Config,
) -> Result<(RowStore, PopulationLookup), SuppressionError> {
    let mut store = RowStore::new();
    let mut population = PopulationLookup::new();

    for (index, input) in rows.into_iter().enumerate() {
        let mut dims = DimKey::new();
        for name in &config.dimensions {
            let value = input
                .columns
                .get(name)
                .map(InputValue::as_dim_value)
                .unwrap_or(DimValue::Null);
            dims.insert(name.clone(), value);
        }

        let incidence_value = input.columns.get(&config.incidence_column).ok_or_else(|| {
            SuppressionError::MalformedInput(format!(
                "row {index}: missing incidence column '{}'",
                config.incidence_column
            ))
        })?;
        let incidence = incidence_value.as_incidence().ok_or_else(|| {
            SuppressionError::MalformedInput(format!(
                "row {index}: incidence column '{}' is not a non-negative integer",
                config.incidence_column
            ))
        })?;

        if let Some(population_column) = &config.population_column {
            if let Some(value) = input.columns.get(population_column) {
                if let Some(pop) = value.as_population() {
                    population.set(dims.clone(), pop);
                } else {
                    return Err(SuppressionError::MalformedInput(format!(
                        "row {index}: population column '{population_column}' is not numeric"
                    )));
                }
            }
        }

        if !store.insert(Row::new(dims.clone(), incidence)) {
            return Err(SuppressionError::MalformedInput(format!(
                "row {index}: duplicate dimension tuple {}",
                serde_json::to_string(&dims).unwrap_or_default()
            )));
        }
    }

    Ok((store, population))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;

    fn cfg() -> Config {
        ConfigBuilder::new()
            .threshold(11)
            .dimensions(["age", "sex"])
            .incidence_column("n")
            .build()
            .unwrap()
    }

    fn row(age: &str, sex: &str, n: i64) -> InputRow {
        let mut r = InputRow::new();
        r.set("age", InputValue::Text(age.to_string()));
        r.set("sex", InputValue::Text(sex.to_string()));
        r.set("n", InputValue::Integer(n));
        r
    }

    #[test]
    fn ingest_builds_one_row_per_input() {
        let (store, _) = ingest(vec![row("35", "M", 12), row("40", "F", 3)], &cfg()).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn missing_dim_column_becomes_null() {
        let mut r = InputRow::new();
        r.set("age", InputValue::Text("35".to_string()));
        r.set("n", InputValue::Integer(5));
        let (store, _) = ingest(vec![r], &cfg()).unwrap();
        let row = store.iter().next().unwrap();
        assert_eq!(row.dims.get("sex"), Some(&DimValue::Null));
    }

    #[test]
    fn negative_incidence_is_rejected() {
        let err = ingest(vec![row("35", "M", -1)], &cfg()).unwrap_err();
        assert!(matches!(err, SuppressionError::MalformedInput(_)));
    }

    #[test]
    fn duplicate_dimension_tuple_is_rejected() {
        let err = ingest(vec![row("35", "M", 12), row("35", "M", 7)], &cfg()).unwrap_err();
        assert!(matches!(err, SuppressionError::MalformedInput(_)));
    }

    #[test]
    fn population_column_is_captured_when_numeric() {
        let cfg = ConfigBuilder::new()
            .threshold(11)
            .dimensions(["age"])
            .incidence_column("n")
            .population_gate("pop", 0.1)
            .build()
            .unwrap();
        let mut r = InputRow::new();
        r.set("age", InputValue::Text("35".to_string()));
        r.set("n", InputValue::Integer(12));
        r.set("pop", InputValue::Float(500.0));
        let (_, population) = ingest(vec![r], &cfg).unwrap();
        let mut dims = DimKey::new();
        dims.insert("age".to_string(), DimValue::from("35"));
        assert_eq!(population.get(&dims), Some(500.0));
    }
}
