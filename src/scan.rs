//! Axis-scan engine (C4).
//!
//! For one axis, groups rows into partitions (spec §4.1's `iter_sorted`),
//! and walks each partition once in scan-dimension order maintaining a
//! small running [`ScanState`] — the direct-computation analogue of the
//! teacher's `dvm/operators/window.rs`, which partitions the same way but
//! emits SQL CTEs to recompute a window function per changed partition.
//! Here there's no SQL, no CTEs, and no "changed partition" detection —
//! every partition is walked every axis pass, a linear scan over rows
//! already in memory, which is simpler and just as correct at the data
//! sizes this domain deals with.

use serde_json::json;
use tracing::debug;

use crate::axis::Axis;
use crate::config::Config;
use crate::dim::project;
use crate::merge::RedactionRecord;
use crate::row::{PeerDescriptor, Row, RowStore};

/// Scan one axis across the whole store, returning the redaction records
/// to merge back in. Never mutates `store` — the whole point of computing
/// `masked_value_count` once per partition up front (spec §9) is that the
/// scan reads one consistent snapshot.
pub fn scan_axis(store: &RowStore, axis: &Axis, config: &Config) -> Vec<RedactionRecord> {
    let non_summable: Vec<String> = config.non_summable_dimensions.iter().cloned().collect();
    let order_by = axis.order_by(&non_summable);
    let partitions = store.iter_sorted(&axis.partition_dims, &order_by);

    let mut records = Vec::new();
    for (_partition_key, rows) in partitions {
        records.extend(scan_partition(&rows, axis, &non_summable, config));
    }

    debug!(
        partition_dims = ?axis.partition_dims,
        scan_dim = %axis.scan_dim,
        found = records.len(),
        "axis scan complete"
    );
    records
}

/// Window-scan state carried from one row to the next within a partition.
struct ScanState<'a> {
    previous: Option<&'a Row>,
    running_sum: u64,
}

fn scan_partition(
    rows: &[&Row],
    axis: &Axis,
    non_summable: &[String],
    config: &Config,
) -> Vec<RedactionRecord> {
    // Partition-global, computed once before the scan starts (spec §9:
    // "masked_value_count ... partition-global at the start of each pass").
    let masked_value_count = rows.iter().filter(|r| r.is_redacted).count();

    let mut state = ScanState {
        previous: None,
        running_sum: 0,
    };
    let mut records = Vec::new();

    for &row in rows {
        state.running_sum += row.incidence;

        if let Some(previous) = state.previous {
            if should_redact(row, previous, state.running_sum, masked_value_count, config.threshold)
                && non_summable_dims_match(row, previous, non_summable)
            {
                records.push(build_record(row, previous, axis, masked_value_count));
            }
        }

        state.previous = Some(row);
    }

    records
}

/// The core trigger predicate, spec §4.4 conditions 1 and 2 (condition 3 —
/// the non-summable match — is checked separately by
/// [`non_summable_dims_match`] so this function stays a pure function of
/// the two rows, the partition's redaction count, and the threshold).
fn should_redact(
    current: &Row,
    previous: &Row,
    running_sum: u64,
    masked_value_count: usize,
    threshold: u64,
) -> bool {
    if current.is_redacted {
        return false;
    }
    if !previous.is_redacted {
        return false;
    }
    if masked_value_count < 2 {
        return true;
    }
    // masked_value_count >= 2: `running_sum` is the partition-prefix
    // cumulative sum through `current` (spec §4.4's `run_sum_by_axis`), not
    // just the pair's own incidences — earlier rows in the window
    // contribute to the total an observer could subtract `previous`'s
    // known value out of.
    let delta = running_sum.saturating_sub(previous.incidence);
    delta < threshold
}

fn non_summable_dims_match(current: &Row, previous: &Row, non_summable: &[String]) -> bool {
    non_summable
        .iter()
        .all(|d| current.dims.get(d) == previous.dims.get(d))
}

fn build_record(
    current: &Row,
    previous: &Row,
    axis: &Axis,
    masked_value_count: usize,
) -> RedactionRecord {
    let mut p_and_s = axis.partition_dims.clone();
    p_and_s.push(axis.scan_dim.clone());

    let own_peer_descriptor: PeerDescriptor = project(&current.dims, &p_and_s);
    let mut peer_group_additions = vec![own_peer_descriptor];
    peer_group_additions.extend(previous.peer_group.iter().cloned());

    let scan_value_descriptor: PeerDescriptor = project(&current.dims, &[axis.scan_dim.clone()]);
    let mut redacted_peers_additions = vec![scan_value_descriptor];
    redacted_peers_additions.extend(previous.redacted_peers.iter().cloned());

    let reason = build_reason(previous, masked_value_count);

    RedactionRecord {
        dims: current.dims.clone(),
        peer_group_additions,
        redacted_peers_additions,
        reason,
    }
}

/// Spec §4.4's reason-construction rule. This wording is a bit-exact
/// external contract (spec §6), so it's spelled out here verbatim rather
/// than built up from fragments that might drift.
fn build_reason(previous: &Row, masked_value_count: usize) -> String {
    if !previous.is_anonymous {
        let previous_row_json = json!(previous.dims).to_string();
        format!("{previous_row_json} was a small cell")
    } else if masked_value_count < 2 {
        previous
            .redaction_reason
            .clone()
            .unwrap_or_else(|| "was a small cell".to_string())
    } else {
        let inherited = previous
            .redaction_reason
            .clone()
            .unwrap_or_else(|| "was a small cell".to_string());
        format!("{inherited} and the delta would construct a small population.")
    }
}
