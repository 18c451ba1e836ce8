//! Canonical label sets.
//!
//! A label set is the unordered collection of (key, value) dimension pairs
//! identifying one metric row. Canonicalizing the pair order at construction
//! makes identity order-independent: two sets with the same pairs hash and
//! compare equal no matter how the export happened to order them.
//!
//! Key order is deterministic: the `group` key always sorts first, all
//! other keys alphabetically. The sorted key tuple is the row's *shape* -
//! rows sharing a shape are rows of one logical table.

use std::cmp::Ordering;
use std::fmt;

use crate::utils::config::GROUP_LABEL;

/// Compare label keys so that `group` comes first.
/// Other keys are sorted alphabetically.
fn compare_label_keys(a: &str, b: &str) -> Ordering {
    // Prioritize the group label by giving it the lowest possible sort value
    let rank = |key: &str| if key == GROUP_LABEL { 0 } else { 1 };
    rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
}

/// An ordered, deduplicated set of (key, value) label pairs
///
/// **Public** - the join key for diffing and the grouping coordinate
/// for aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LabelSet(Vec<(String, String)>);

impl LabelSet {
    /// Build a canonical label set from raw pairs.
    ///
    /// Pairs are reordered into canonical key order. If a key appears
    /// more than once, the last value wins.
    pub fn from_pairs(mut pairs: Vec<(String, String)>) -> Self {
        pairs.sort_by(|a, b| compare_label_keys(&a.0, &b.0));
        // Stable sort keeps duplicates in input order; keep the last one.
        pairs.reverse();
        pairs.dedup_by(|a, b| a.0 == b.0);
        pairs.reverse();
        LabelSet(pairs)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// The shape: all keys in canonical order.
    pub fn shape(&self) -> Vec<String> {
        self.0.iter().map(|(key, _)| key.clone()).collect()
    }

    /// All values, in the same canonical order as `shape`.
    pub fn values(&self) -> Vec<String> {
        self.0.iter().map(|(_, value)| value.clone()).collect()
    }

    /// Look up the value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }

    /// Whether this set carries the exact (key, value) pair.
    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }
}

impl From<Vec<(String, String)>> for LabelSet {
    fn from(pairs: Vec<(String, String)>) -> Self {
        LabelSet::from_pairs(pairs)
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        Ok(())
    }
}
