//! Error types for the suppression engine.
//!
//! All errors the engine can produce are represented by [`SuppressionError`].
//! Errors are propagated via `Result<T, SuppressionError>` throughout the
//! crate and surfaced to callers as structured values — there is no implicit
//! logging, retry, or partial-output behavior on failure (spec §7: the
//! computation is deterministic and non-I/O, so none of the three kinds
//! below are recoverable from within the engine itself).

/// Primary error type for `suppress()` and its helpers.
#[derive(Debug, thiserror::Error)]
pub enum SuppressionError {
    // ── Config errors — caught before any row is touched ─────────────────
    /// The configuration itself is inconsistent (threshold ≤ 0, empty
    /// dimension list, incidence column collides with a dimension, or a
    /// non-summable dimension isn't in the dimension list).
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    // ── Input errors — caught during ingestion, before classification ────
    /// A row's incidence value was missing, non-integer, negative, or a
    /// dimension tuple was duplicated across input rows.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    // ── Internal errors — indicate a bug, not a bad caller ───────────────
    /// The fixed-point loop exceeded its bounded safety iteration count
    /// without converging. Redactions are monotonic and bounded by the row
    /// count, so this can only happen if that invariant was broken.
    #[error("internal invariant violation: {0}")]
    InternalInvariantViolation(String),
}
