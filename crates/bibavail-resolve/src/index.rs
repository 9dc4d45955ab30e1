//! Request-scoped availability index.

use std::collections::HashMap;

use bibavail_core::Holding;

/// Mapping from record id to decoded holdings, owned by one resolver run.
///
/// Grows monotonically: entries are added or merged, never removed, for
/// the lifetime of one page's resolution. Merging concatenates, which is
/// what lets inventory split across linked bound-with records accumulate
/// from separate batches.
#[derive(Debug, Default)]
pub struct AvailabilityIndex {
    records: HashMap<String, Vec<Holding>>,
}

impl AvailabilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one decoded batch. Holdings for an id already present are
    /// appended in arrival order.
    pub fn merge(&mut self, records: HashMap<String, Vec<Holding>>) {
        for (record_id, holdings) in records {
            self.records.entry(record_id).or_default().extend(holdings);
        }
    }

    pub fn holdings(&self, record_id: &str) -> Option<&[Holding]> {
        self.records.get(record_id).map(Vec::as_slice)
    }

    pub fn contains(&self, record_id: &str) -> bool {
        self.records.contains_key(record_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
