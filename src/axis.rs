//! Dimension-subset enumerator (C3).
//!
//! Materializes the full ordered sequence of `(partition_dims, scan_dim)`
//! axes up front, the same way the teacher's `dag.rs` builds its node list
//! before traversing it rather than generating nodes lazily — at the row
//! and dimension counts this domain deals with, the axis list itself is
//! never large enough for laziness to matter, and a materialized `Vec` is
//! easier to reason about and to unit-test in isolation.

use crate::config::Config;

/// One `(partition_dims, scan_dim)` pair to check for subtraction leaks
/// (spec §3/§4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    pub partition_dims: Vec<String>,
    pub scan_dim: String,
}

impl Axis {
    /// The order used inside a partition for this axis: scan dimension
    /// first, then every non-summable dimension as a tie-break (spec §4.4:
    /// "rows are ordered by s ascending (with N-dimension tie-breaks also
    /// included in the order to make lag semantics well-defined)").
    pub fn order_by(&self, non_summable: &[String]) -> Vec<String> {
        let mut order = vec![self.scan_dim.clone()];
        order.extend(non_summable.iter().cloned());
        order
    }
}

/// Enumerate every axis `(P, s)` for `P` a non-empty subset of `D` and
/// `s ∈ S \ P`, ordered by `|P|` ascending then lexicographically (spec
/// §4.3). `D` and `N` are read off `config.dimensions` /
/// `config.non_summable_dimensions`; `S = D \ N`.
pub fn enumerate_axes(config: &Config) -> Vec<Axis> {
    // Sorted independent of the order the caller happened to list
    // `dimensions` in — the lexicographic tie-break (spec §4.3) must be a
    // property of dimension names, not of config authoring order, since it
    // decides which axis's reason wins first-writer-wins on a given row.
    let mut dims: Vec<String> = config.dimensions.clone();
    dims.sort();
    let mut summable = config.summable_dimensions();
    summable.sort();

    let mut axes = Vec::new();
    for partition_size in 1..=dims.len() {
        for partition in subsets_of_size(&dims, partition_size) {
            for scan_dim in &summable {
                if partition.contains(scan_dim) {
                    continue;
                }
                axes.push(Axis {
                    partition_dims: partition.clone(),
                    scan_dim: scan_dim.clone(),
                });
            }
        }
    }
    axes
}

/// All subsets of `items` with exactly `size` elements, each subset kept in
/// `items`' original (lexicographic, since `items` is `config.dimensions`)
/// order, subsets themselves enumerated in lexicographic order of the
/// indices chosen.
fn subsets_of_size(items: &[String], size: usize) -> Vec<Vec<String>> {
    if size == 0 {
        return vec![Vec::new()];
    }
    if size > items.len() {
        return Vec::new();
    }

    let mut result = Vec::new();
    let mut indices: Vec<usize> = (0..size).collect();
    loop {
        result.push(indices.iter().map(|&i| items[i].clone()).collect());

        // Advance to the next combination of indices (standard
        // combinations-in-lexicographic-order algorithm).
        let mut i = size;
        loop {
            if i == 0 {
                return result;
            }
            i -= 1;
            if indices[i] != i + items.len() - size {
                break;
            }
        }
        indices[i] += 1;
        for j in (i + 1)..size {
            indices[j] = indices[j - 1] + 1;
        }
    }
}
