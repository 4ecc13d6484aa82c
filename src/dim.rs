//! Dimension values and dimension-keyed maps.
//!
//! A [`DimValue`] is one categorical value along one dimension. Missing
//! values are a distinct category (spec §3/§6: "Missing dimension values
//! are treated as a distinct 'null' category") rather than the absence of
//! a value, so `DimValue` has no `Option` wrapper of its own — `Null` is a
//! variant, not an outer `None`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One categorical value along one dimension.
///
/// `Ord` is derived rather than hand-written: `Null` sorts before any
/// `Text`, and `Text` sorts lexicographically — both are acceptable
/// orderings for spec §4.1's "stable order ... ties broken by ... value
/// order" requirement, which only needs *a* total order, not a specific one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimValue {
    Null,
    Text(String),
}

impl DimValue {
    /// The display form used when a value is interpolated into a redaction
    /// reason or a row's JSON projection (spec §3: "compared as the string
    /// `<null>`" — that sentinel is a display-time convention, never used
    /// for equality/ordering, which always operate on the `Null` variant).
    pub fn display(&self) -> &str {
        match self {
            DimValue::Null => "<null>",
            DimValue::Text(s) => s,
        }
    }
}

impl fmt::Display for DimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

impl From<&str> for DimValue {
    fn from(s: &str) -> Self {
        DimValue::Text(s.to_string())
    }
}

impl From<String> for DimValue {
    fn from(s: String) -> Self {
        DimValue::Text(s)
    }
}

/// An ordered mapping from dimension name to categorical value — spec §3's
/// "ordered mapping from dimension name to categorical value". `BTreeMap`
/// gives both the ordering and a `Eq`/`Ord` identity for free, which is
/// exactly what's needed to use a full dimension tuple as a row's primary
/// key and a partial tuple as a peer-group/partition descriptor.
pub type DimKey = BTreeMap<String, DimValue>;

/// Project a full dimension tuple onto a subset of dimension names,
/// producing the partial tuple used for peer-group and partition
/// descriptors (spec §4.2's "current dims projected onto the full
/// dimension set" and §4.4's "projection on P∪{s}").
pub fn project(dims: &DimKey, names: &[String]) -> DimKey {
    names
        .iter()
        .filter_map(|name| dims.get(name).map(|v| (name.clone(), v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(pairs: &[(&str, &str)]) -> DimKey {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), DimValue::from(*v)))
            .collect()
    }

    #[test]
    fn null_sorts_before_text() {
        assert!(DimValue::Null < DimValue::from("a"));
    }

    #[test]
    fn display_uses_null_sentinel_but_ord_does_not() {
        assert_eq!(DimValue::Null.display(), "<null>");
        assert_ne!(DimValue::Null, DimValue::from("<null>"));
    }

    #[test]
    fn project_keeps_only_requested_dims_in_existing_order() {
        let dims = key(&[("age", "35"), ("sex", "M"), ("county", "00000")]);
        let projected = project(&dims, &["sex".to_string(), "county".to_string()]);
        assert_eq!(projected.len(), 2);
        assert_eq!(projected.get("sex"), Some(&DimValue::from("M")));
        assert!(!projected.contains_key("age"));
    }

    #[test]
    fn project_onto_missing_dim_just_skips_it() {
        let dims = key(&[("age", "35")]);
        let projected = project(&dims, &["county".to_string()]);
        assert!(projected.is_empty());
    }
}
