//! Row store (C1) — the typed in-memory table the rest of the engine
//! operates over.
//!
//! Row identity is the full dimension tuple (spec §3: "Dimension tuple is
//! unique (primary key)"). `RowId` hashes that tuple the way
//! `RowIdStrategy::AllColumns` does for operators with no primary key: hash
//! every column because there's nothing narrower to key on. It isn't used
//! as the map key itself (the `DimKey` is; a `BTreeMap` only needs `Ord`),
//! but it gives tracing events and external callers a compact, stable
//! reference to a row without serializing its full dimension tuple.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::xxh64;

use crate::dim::{project, DimKey, DimValue};

const ROW_ID_SEED: u64 = 0x517cc1b727220a95;

/// A stable 64-bit fingerprint of a dimension tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(pub u64);

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Compute a row's identity hash from its full dimension tuple.
///
/// Dimensions are already ordered by name (`DimKey` is a `BTreeMap`), so
/// this is deterministic regardless of input column order; a `\x1E` record
/// separator between name/value pairs prevents `("ab", "c")` colliding with
/// `("a", "bc")`, and `\x00NULL\x00` distinguishes the null category from
/// the literal text "NULL".
pub fn row_fingerprint(dims: &DimKey) -> RowId {
    let mut buf = String::new();
    for (name, value) in dims {
        if !buf.is_empty() {
            buf.push('\x1E');
        }
        buf.push_str(name);
        buf.push('\x1F');
        match value {
            DimValue::Null => buf.push_str("\x00NULL\x00"),
            DimValue::Text(s) => buf.push_str(s),
        }
    }
    RowId(xxh64(buf.as_bytes(), ROW_ID_SEED))
}

/// A partition/peer-group descriptor: a projection of a dimension tuple
/// onto a subset of dimensions (spec §3: "Each entry names the dimensions
/// over which the row was grouped when suppressed").
pub type PeerDescriptor = BTreeMap<String, DimValue>;

/// One row of the suppression dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub dims: DimKey,
    pub incidence: u64,
    pub is_anonymous: bool,
    pub is_redacted: bool,
    pub redaction_reason: Option<String>,
    pub peer_group: BTreeSet<PeerDescriptor>,
    pub redacted_peers: BTreeSet<PeerDescriptor>,
}

impl Row {
    pub fn new(dims: DimKey, incidence: u64) -> Self {
        Row {
            dims,
            incidence,
            is_anonymous: false,
            is_redacted: false,
            redaction_reason: None,
            peer_group: BTreeSet::new(),
            redacted_peers: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> RowId {
        row_fingerprint(&self.dims)
    }

    /// The row's own dimension tuple as a peer-group entry of itself —
    /// used when a row is primary-redacted (spec §4.2: "peer_group :=
    /// {current dims projected onto the full dimension set}").
    pub fn self_descriptor(&self) -> PeerDescriptor {
        self.dims.clone()
    }
}

/// A snapshot of the fields a neighboring row in a window needs to see,
/// taken *before* this pass's merges are applied (spec §4.4's "pre-merge"
/// context fields: `previous_cell_is_anonymous`, etc., all read the state
/// of the previous row as it stood before the current axis pass began).
#[derive(Debug, Clone)]
pub struct RowSnapshot {
    pub dims: DimKey,
    pub incidence: u64,
    pub is_anonymous: bool,
    pub is_redacted: bool,
    pub redaction_reason: Option<String>,
    pub peer_group: BTreeSet<PeerDescriptor>,
    pub redacted_peers: BTreeSet<PeerDescriptor>,
}

impl From<&Row> for RowSnapshot {
    fn from(row: &Row) -> Self {
        RowSnapshot {
            dims: row.dims.clone(),
            incidence: row.incidence,
            is_anonymous: row.is_anonymous,
            is_redacted: row.is_redacted,
            redaction_reason: row.redaction_reason.clone(),
            peer_group: row.peer_group.clone(),
            redacted_peers: row.redacted_peers.clone(),
        }
    }
}

/// The typed in-memory table. Keyed by the full dimension tuple so lookups,
/// insertion-order-independent iteration, and uniqueness are all free
/// properties of `BTreeMap`.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: BTreeMap<DimKey, Row>,
}

impl RowStore {
    pub fn new() -> Self {
        RowStore {
            rows: BTreeMap::new(),
        }
    }

    /// Insert a freshly-ingested row. Returns `false` if the dimension
    /// tuple was already present (callers turn that into a `MalformedInput`
    /// error per spec §7 — duplicate dimension tuples are not a store-level
    /// concern, they're an ingestion-level one).
    pub fn insert(&mut self, row: Row) -> bool {
        if self.rows.contains_key(&row.dims) {
            return false;
        }
        self.rows.insert(row.dims.clone(), row);
        true
    }

    pub fn get(&self, dims: &DimKey) -> Option<&Row> {
        self.rows.get(dims)
    }

    pub fn get_mut(&mut self, dims: &DimKey) -> Option<&mut Row> {
        self.rows.get_mut(dims)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Row> {
        self.rows.values_mut()
    }

    /// Group rows by their projection onto `partition_dims`, each group
    /// internally ordered by `order_by` then the rows' full dimension tuple
    /// as a final, always-available tie-break (spec §4.1: "Stability is
    /// required for deterministic window scans").
    ///
    /// Groups themselves come out ordered by the partition key
    /// (`BTreeMap` iteration order), matching spec §4.1's "stable order".
    pub fn iter_sorted<'a>(
        &'a self,
        partition_dims: &[String],
        order_by: &[String],
    ) -> Vec<(PeerDescriptor, Vec<&'a Row>)> {
        let mut groups: BTreeMap<PeerDescriptor, Vec<&'a Row>> = BTreeMap::new();
        for row in self.rows.values() {
            let key = project(&row.dims, partition_dims);
            groups.entry(key).or_default().push(row);
        }
        for rows in groups.values_mut() {
            rows.sort_by(|a, b| {
                for name in order_by {
                    let av = a.dims.get(name);
                    let bv = b.dims.get(name);
                    match av.cmp(&bv) {
                        std::cmp::Ordering::Equal => continue,
                        other => return other,
                    }
                }
                a.dims.cmp(&b.dims)
            });
        }
        groups.into_iter().collect()
    }

    /// Union `additions` into an existing peer/redacted-peer set and set
    /// the reason if one isn't already recorded — spec §4.5's merge rule,
    /// shared by both the classifier's primary redactions and the axis
    /// scan's latent-revelation redactions.
    pub fn apply_redaction(
        &mut self,
        dims: &DimKey,
        reason: String,
        peer_group_additions: impl IntoIterator<Item = PeerDescriptor>,
        redacted_peers_additions: impl IntoIterator<Item = PeerDescriptor>,
    ) -> bool {
        let Some(row) = self.rows.get_mut(dims) else {
            return false;
        };
        let was_redacted = row.is_redacted;
        row.is_redacted = true;
        if row.redaction_reason.is_none() {
            row.redaction_reason = Some(reason);
        }
        row.peer_group.extend(peer_group_additions);
        row.redacted_peers.extend(redacted_peers_additions);
        !was_redacted
    }
}
