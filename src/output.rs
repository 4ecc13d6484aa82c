//! Output projection (C8).
//!
//! Turns the internal [`crate::row::RowStore`] into the flat, serializable
//! shape described in spec §6: one row per dimension tuple, incidence
//! replaced by a sentinel where redacted, plus `peer_group`/`redacted_peers`
//! carried through unchanged (spec §6: "`peer_group`: a JSON array of
//! objects ...; `redacted_peers`: same shape"), a reason, and a summary
//! stats block.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::dim::DimKey;
use crate::row::{PeerDescriptor, RowStore};

/// One row of the published, suppression-applied output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputRow {
    pub dims: DimKey,
    /// `None` when redacted — callers render the sentinel from
    /// [`SuppressionOutput::redaction_sentinel`], keeping the machine-
    /// readable value distinct from its display string.
    pub incidence: Option<u64>,
    /// The already-stringified form (`"Redacted"` or the number) — spec
    /// §6's published shape only ever carries this, but in-process callers
    /// doing further numeric analysis on `incidence` shouldn't have to
    /// re-parse it back out of a string.
    pub display_incidence: String,
    pub is_redacted: bool,
    pub redaction_reason: Option<String>,
    pub peer_group: Vec<PeerDescriptor>,
    pub redacted_peers: Vec<PeerDescriptor>,
}

/// Aggregate counters over a completed run (spec §6: "summary counts for
/// audit/logging purposes").
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SuppressionStats {
    pub total_rows: usize,
    pub redacted_rows: usize,
    pub fixed_point_passes: usize,
}

/// The full result of a [`crate::suppress`] call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressionOutput {
    pub rows: Vec<OutputRow>,
    pub stats: SuppressionStats,
    pub redaction_sentinel: String,
}

pub fn project_output(store: &RowStore, config: &Config, passes: usize) -> SuppressionOutput {
    let mut rows = Vec::with_capacity(store.len());
    let mut redacted_rows = 0;

    for row in store.iter() {
        if row.is_redacted {
            redacted_rows += 1;
        }
        rows.push(OutputRow {
            dims: row.dims.clone(),
            incidence: if row.is_redacted { None } else { Some(row.incidence) },
            display_incidence: if row.is_redacted {
                config.redaction_sentinel.clone()
            } else {
                row.incidence.to_string()
            },
            is_redacted: row.is_redacted,
            redaction_reason: row.redaction_reason.clone(),
            peer_group: row.peer_group.iter().cloned().collect(),
            redacted_peers: row.redacted_peers.iter().cloned().collect(),
        });
    }

    SuppressionOutput {
        stats: SuppressionStats {
            total_rows: rows.len(),
            redacted_rows,
            fixed_point_passes: passes,
        },
        rows,
        redaction_sentinel: config.redaction_sentinel.clone(),
    }
}
