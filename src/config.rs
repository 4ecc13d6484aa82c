//! Engine configuration (C7).
//!
//! Unlike the teacher's GUC-registry config (this isn't a Postgres
//! extension — there's no server process to register settings with), a
//! `Config` is a plain, builder-validated struct: construct it with
//! [`ConfigBuilder`], call [`ConfigBuilder::build`], and get back either a
//! validated `Config` or the [`SuppressionError::InvalidConfig`] that
//! explains what was wrong with it. There is no mutable global config
//! anywhere in this crate — every call to `suppress()` takes its own.

use std::collections::BTreeSet;

use crate::error::SuppressionError;

/// Engine configuration — spec §4.7.
#[derive(Debug, Clone)]
pub struct Config {
    /// Minimum count to be anonymous. Cells with `incidence < threshold`
    /// are primary-redacted. Must be `>= 1`.
    pub threshold: u64,

    /// If `true`, skip latent-revelation propagation (§4.3–§4.6) entirely
    /// and stop after the classifier's primary redaction pass. Useful for
    /// comparing against the full engine in tests, or for publishers whose
    /// disclosure review only requires primary suppression.
    pub first_order_only: bool,

    /// The full ordered dimension set `D`. Every other input column is
    /// passthrough and never participates in partitioning or scanning.
    pub dimensions: Vec<String>,

    /// Dimensions whose totals are never published (`N ⊆ D`). Axes are
    /// only ever scanned in the *summable* direction `s ∈ D \ N`; two rows
    /// are only considered subtraction-adjacent when they agree on every
    /// non-summable dimension (spec §4.4 condition 3).
    pub non_summable_dimensions: BTreeSet<String>,

    /// Which input column holds the count to suppress on.
    pub incidence_column: String,

    /// Value substituted into the output for redacted incidence.
    pub redaction_sentinel: String,

    /// Optional auxiliary population-gate column (SPEC_FULL.md §4.2's
    /// additive rate-based gate). When set together with
    /// `min_population_ratio`, a row also needs
    /// `incidence / population >= min_population_ratio` to count as
    /// anonymous, on top of the count threshold. `None` (the default)
    /// reproduces spec.md's count-only rule exactly.
    pub population_column: Option<String>,

    /// Minimum `incidence / population` ratio required when
    /// `population_column` is set. Ignored otherwise.
    pub min_population_ratio: Option<f64>,

    /// Safety bound on fixed-point passes before the engine gives up and
    /// returns `InternalInvariantViolation` (spec §7's "suggested: `2 ×
    /// rows`"). `None` means use that suggested default at run time, scaled
    /// to the actual row count the engine sees — it can't be fixed at
    /// config-build time since the row count isn't known yet.
    pub max_safety_iterations: Option<usize>,
}

/// Builds and validates a [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    threshold: Option<u64>,
    first_order_only: bool,
    dimensions: Vec<String>,
    non_summable_dimensions: BTreeSet<String>,
    incidence_column: Option<String>,
    redaction_sentinel: Option<String>,
    population_column: Option<String>,
    min_population_ratio: Option<f64>,
    max_safety_iterations: Option<usize>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        ConfigBuilder::default()
    }

    pub fn threshold(mut self, threshold: u64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn first_order_only(mut self, first_order_only: bool) -> Self {
        self.first_order_only = first_order_only;
        self
    }

    pub fn dimensions<I, S>(mut self, dims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimensions = dims.into_iter().map(Into::into).collect();
        self
    }

    pub fn non_summable_dimensions<I, S>(mut self, dims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_summable_dimensions = dims.into_iter().map(Into::into).collect();
        self
    }

    pub fn incidence_column(mut self, column: impl Into<String>) -> Self {
        self.incidence_column = Some(column.into());
        self
    }

    pub fn redaction_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.redaction_sentinel = Some(sentinel.into());
        self
    }

    pub fn population_gate(mut self, column: impl Into<String>, min_ratio: f64) -> Self {
        self.population_column = Some(column.into());
        self.min_population_ratio = Some(min_ratio);
        self
    }

    pub fn max_safety_iterations(mut self, max: usize) -> Self {
        self.max_safety_iterations = Some(max);
        self
    }

    /// Validate and produce a [`Config`], or an [`SuppressionError::InvalidConfig`]
    /// describing the first problem found.
    pub fn build(self) -> Result<Config, SuppressionError> {
        let threshold = self.threshold.unwrap_or(0);
        if threshold < 1 {
            return Err(SuppressionError::InvalidConfig(
                "threshold must be >= 1".to_string(),
            ));
        }

        if self.dimensions.is_empty() {
            return Err(SuppressionError::InvalidConfig(
                "dimensions list must not be empty".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for dim in &self.dimensions {
            if !seen.insert(dim) {
                return Err(SuppressionError::InvalidConfig(format!(
                    "dimension '{dim}' listed more than once"
                )));
            }
        }

        let incidence_column = self.incidence_column.ok_or_else(|| {
            SuppressionError::InvalidConfig("incidence_column must be set".to_string())
        })?;
        if self.dimensions.contains(&incidence_column) {
            return Err(SuppressionError::InvalidConfig(format!(
                "incidence_column '{incidence_column}' must not also be a dimension"
            )));
        }

        for dim in &self.non_summable_dimensions {
            if !self.dimensions.contains(dim) {
                return Err(SuppressionError::InvalidConfig(format!(
                    "non-summable dimension '{dim}' is not in the dimensions list"
                )));
            }
        }

        if self.min_population_ratio.is_some() && self.population_column.is_none() {
            return Err(SuppressionError::InvalidConfig(
                "min_population_ratio set without a population_column".to_string(),
            ));
        }

        Ok(Config {
            threshold,
            first_order_only: self.first_order_only,
            dimensions: self.dimensions,
            non_summable_dimensions: self.non_summable_dimensions,
            incidence_column,
            redaction_sentinel: self
                .redaction_sentinel
                .unwrap_or_else(|| "Redacted".to_string()),
            population_column: self.population_column,
            min_population_ratio: self.min_population_ratio,
            max_safety_iterations: self.max_safety_iterations,
        })
    }
}

impl Config {
    /// The summable dimension subset `S = D \ N` (spec §4.3).
    pub fn summable_dimensions(&self) -> Vec<String> {
        self.dimensions
            .iter()
            .filter(|d| !self.non_summable_dimensions.contains(*d))
            .cloned()
            .collect()
    }
}
