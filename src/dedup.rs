//! First-occurrence deduplication of entities embedded in source rows.
//!
//! The canonical row for a key is the first one encountered in source order.
//! Later rows with the same key are discarded, never merged. Rows without a
//! key are excluded and can therefore never be referenced by a foreign key.

use crate::coerce::{coerce_integer, coerce_text};
use crate::source::SourceRow;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::hash::Hash;

/// Stable external identifier of a customer.
pub type SourceCustomerId = i64;

/// Textual placeholder some exports write for a missing product name.
pub const MISSING_NAME_PLACEHOLDER: &str = "nan";

/// Canonical rows per key, in first-occurrence order.
#[derive(Debug)]
pub struct Deduplicated<'a, K> {
    entries: IndexMap<K, &'a SourceRow>,
    /// Rows with no usable key.
    pub excluded: usize,
    /// Rows discarded because their key was already taken.
    pub duplicates: usize,
}

impl<'a, K: Hash + Eq> Deduplicated<'a, K> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&'a SourceRow> {
        self.entries.get(key).copied()
    }

    /// Canonical `(key, row)` pairs in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &'a SourceRow)> + '_ {
        self.entries.iter().map(|(k, row)| (k, *row))
    }
}

/// Keep the first row for every distinct key.
pub fn dedup_first_by<'a, K, F>(rows: &'a [SourceRow], key_fn: F) -> Deduplicated<'a, K>
where
    K: Hash + Eq,
    F: Fn(&SourceRow) -> Option<K>,
{
    let mut entries = IndexMap::new();
    let mut excluded = 0;
    let mut duplicates = 0;

    for row in rows {
        match key_fn(row) {
            None => excluded += 1,
            Some(key) => match entries.entry(key) {
                Entry::Occupied(_) => duplicates += 1,
                Entry::Vacant(slot) => {
                    slot.insert(row);
                }
            },
        }
    }

    Deduplicated {
        entries,
        excluded,
        duplicates,
    }
}

/// Customer key: the integer-coerced `Customer Id`.
pub fn customer_key(row: &SourceRow) -> Option<SourceCustomerId> {
    coerce_integer(&row.customer_id)
}

/// Product key: the trimmed `Product Name`, excluding blanks and the placeholder.
pub fn product_key(row: &SourceRow) -> Option<String> {
    let name = coerce_text(&row.product_name)?;
    let name = name.trim();
    if name.is_empty() || name == MISSING_NAME_PLACEHOLDER {
        return None;
    }
    Some(name.to_string())
}
