//! Redaction merger (C5).
//!
//! Takes the batch of [`RedactionRecord`]s one axis's scan identified and
//! applies them back into the row store — spec §4.5. Kept as its own
//! module (rather than folded into [`crate::scan`]) because the axis
//! scanner only ever *reads* the store (it must see a consistent snapshot
//! for the whole partition, per spec §9's "masked_value_count is
//! partition-global at the start of [the] pass"); only the merger mutates.

use crate::row::{PeerDescriptor, RowStore};
use crate::dim::DimKey;

/// One row newly identified for redaction by an axis scan, and the
/// peer/reason information it should be merged with (spec §4.4's
/// "Redaction record produced").
#[derive(Debug, Clone)]
pub struct RedactionRecord {
    pub dims: DimKey,
    pub peer_group_additions: Vec<PeerDescriptor>,
    pub redacted_peers_additions: Vec<PeerDescriptor>,
    pub reason: String,
}

/// Apply every record to `store`. Returns the number of rows that went
/// from not-redacted to redacted as a result — the fixed-point driver uses
/// a non-zero count to decide whether another pass is needed.
pub fn apply_all(store: &mut RowStore, records: Vec<RedactionRecord>) -> usize {
    let mut newly_redacted = 0;
    for record in records {
        let changed = store.apply_redaction(
            &record.dims,
            record.reason,
            record.peer_group_additions,
            record.redacted_peers_additions,
        );
        if changed {
            newly_redacted += 1;
        }
    }
    newly_redacted
}
