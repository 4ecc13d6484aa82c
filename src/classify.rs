//! Anonymity classifier (C2).
//!
//! Stamps every row `is_anonymous` and, for the ones that fail, performs
//! the primary redaction — spec §4.2. This runs exactly once, before any
//! axis is scanned, and establishes the seed set the fixed-point driver
//! (C6) then propagates outward from.

use crate::config::Config;
use crate::row::RowStore;

/// How many rows were primary-redacted by this pass.
pub struct ClassifyReport {
    pub primary_redacted: usize,
}

/// Classify every row in `store` against `config`, primary-redacting the
/// ones that aren't anonymous.
///
/// The optional population gate (SPEC_FULL.md §4.2) only ever *narrows*
/// anonymity relative to the count-only rule: a row still needs
/// `incidence >= threshold` first, and additionally needs
/// `incidence / population >= min_population_ratio` when the gate is
/// configured. A row missing its population value when the gate is active
/// is treated as not anonymous — a publisher who opted into rate-based
/// suppression has no rate to check, so caution wins.
pub fn classify(store: &mut RowStore, config: &Config, population: &PopulationLookup) -> ClassifyReport {
    let mut primary_redacted = 0;

    for row in store.iter_mut() {
        let meets_count = row.incidence >= config.threshold;
        let meets_population = match (config.min_population_ratio, config.population_column.as_ref()) {
            (Some(min_ratio), Some(_)) => match population.get(&row.dims) {
                Some(pop) if pop > 0.0 => (row.incidence as f64 / pop) >= min_ratio,
                _ => false,
            },
            _ => true,
        };

        row.is_anonymous = meets_count && meets_population;

        if !row.is_anonymous {
            row.is_redacted = true;
            row.redaction_reason = Some("was a small cell".to_string());
            row.peer_group.insert(row.self_descriptor());
            primary_redacted += 1;
        }
    }

    ClassifyReport { primary_redacted }
}

/// Maps a dimension tuple to its auxiliary population value, used only
/// when `Config::population_column` is set. Held separately from `Row`
/// rather than as a `Row` field because it's a passthrough input value,
/// not part of the suppression data model spec §3 defines.
#[derive(Debug, Clone, Default)]
pub struct PopulationLookup {
    values: std::collections::BTreeMap<crate::dim::DimKey, f64>,
}

impl PopulationLookup {
    pub fn new() -> Self {
        PopulationLookup::default()
    }

    pub fn set(&mut self, dims: crate::dim::DimKey, population: f64) {
        self.values.insert(dims, population);
    }

    pub fn get(&self, dims: &crate::dim::DimKey) -> Option<f64> {
        self.values.get(dims).copied()
    }

    /// Fill in entries from `other` for dimension tuples this lookup
    /// doesn't already have a value for. Used to layer an externally
    /// supplied population table under whatever population values were
    /// already present on the ingested rows themselves.
    pub fn merge_missing(&mut self, other: PopulationLookup) {
        for (dims, value) in other.values {
            self.values.entry(dims).or_insert(value);
        }
    }
}
