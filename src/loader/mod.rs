//! Entity loaders.
//!
//! Each loader makes one pass over the source rows, inserts what it can and
//! tallies what it cannot. Only sink commit failures escape a loader; a failed
//! insert is counted and the pass continues.

pub mod customers;
pub mod orders;
pub mod products;
pub mod shipping;

pub use customers::load_customers;
pub use orders::load_orders;
pub use products::load_products;
pub use shipping::load_shipping;

use crate::error::SinkError;
use crate::sink::{GeneratedKey, Sink};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use tracing::info;

/// Source key to generated key, built once per run.
pub type KeyMap<K> = HashMap<K, GeneratedKey>;

/// Why a candidate row produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoCustomer,
    NoProduct,
    NoOrder,
    Error,
}

impl SkipReason {
    pub const ALL: [SkipReason; 4] = [
        SkipReason::NoCustomer,
        SkipReason::NoProduct,
        SkipReason::NoOrder,
        SkipReason::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NoCustomer => "no_customer",
            SkipReason::NoProduct => "no_product",
            SkipReason::NoOrder => "no_order",
            SkipReason::Error => "error",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-reason skip counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkipTally {
    pub no_customer: usize,
    pub no_product: usize,
    pub no_order: usize,
    pub error: usize,
}

impl SkipTally {
    pub fn record(&mut self, reason: SkipReason) {
        *self.slot(reason) += 1;
    }

    pub fn count(&self, reason: SkipReason) -> usize {
        match reason {
            SkipReason::NoCustomer => self.no_customer,
            SkipReason::NoProduct => self.no_product,
            SkipReason::NoOrder => self.no_order,
            SkipReason::Error => self.error,
        }
    }

    pub fn total(&self) -> usize {
        self.no_customer + self.no_product + self.no_order + self.error
    }

    fn slot(&mut self, reason: SkipReason) -> &mut usize {
        match reason {
            SkipReason::NoCustomer => &mut self.no_customer,
            SkipReason::NoProduct => &mut self.no_product,
            SkipReason::NoOrder => &mut self.no_order,
            SkipReason::Error => &mut self.error,
        }
    }
}

impl fmt::Display for SkipTally {
    /// Non-zero reasons only, e.g. `no_customer=3, error=1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = SkipReason::ALL
            .iter()
            .filter(|reason| self.count(**reason) > 0)
            .map(|reason| format!("{}={}", reason, self.count(*reason)))
            .collect();
        if parts.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Result of a loader that produces a key map.
#[derive(Debug, Clone)]
pub struct LoadOutcome<K: Hash + Eq> {
    /// Rows considered for insertion.
    pub candidates: usize,
    /// Source key to generated key for every successful insert.
    pub inserted: KeyMap<K>,
    pub skipped: SkipTally,
}

impl<K: Hash + Eq> Default for LoadOutcome<K> {
    fn default() -> Self {
        Self {
            candidates: 0,
            inserted: KeyMap::new(),
            skipped: SkipTally::default(),
        }
    }
}

impl<K: Hash + Eq> LoadOutcome<K> {
    /// Records that made it into the key map.
    pub fn imported(&self) -> usize {
        self.inserted.len()
    }
}

/// Result of the shipping loader. Nothing downstream needs its keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShippingOutcome {
    pub candidates: usize,
    pub imported: usize,
    pub skipped: SkipTally,
}

/// Commits every `batch_size` successful inserts and once more at the end.
pub(crate) struct BatchCommitter {
    phase: &'static str,
    batch_size: usize,
    pending: usize,
    imported: usize,
}

impl BatchCommitter {
    pub(crate) fn new(phase: &'static str, batch_size: usize) -> Self {
        Self {
            phase,
            batch_size: batch_size.max(1),
            pending: 0,
            imported: 0,
        }
    }

    /// Count one successful insert, committing when the batch is full.
    pub(crate) fn record<S: Sink + ?Sized>(&mut self, sink: &mut S) -> Result<(), SinkError> {
        self.imported += 1;
        self.pending += 1;
        if self.pending >= self.batch_size {
            sink.commit()?;
            self.pending = 0;
            info!(phase = self.phase, imported = self.imported, "Committed batch");
        }
        Ok(())
    }

    /// Final commit, covering any partial batch and skipped-only passes.
    pub(crate) fn finish<S: Sink + ?Sized>(self, sink: &mut S) -> Result<usize, SinkError> {
        sink.commit()?;
        Ok(self.imported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    #[test]
    fn test_tally_total_and_display() {
        let mut tally = SkipTally::default();
        tally.record(SkipReason::NoCustomer);
        tally.record(SkipReason::NoCustomer);
        tally.record(SkipReason::Error);

        assert_eq!(tally.count(SkipReason::NoCustomer), 2);
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.to_string(), "no_customer=2, error=1");
        assert_eq!(SkipTally::default().to_string(), "none");
    }

    #[test]
    fn test_batch_committer_commits_full_batches_and_remainder() {
        let mut sink = MemorySink::new();
        let mut committer = BatchCommitter::new("test", 2);
        for _ in 0..5 {
            committer.record(&mut sink).unwrap();
        }
        assert_eq!(sink.commit_count(), 2);

        assert_eq!(committer.finish(&mut sink).unwrap(), 5);
        assert_eq!(sink.commit_count(), 3);
    }
}
