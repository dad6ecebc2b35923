use std::collections::HashMap;

use super::key::FlowKey;
use super::record::FlowRecord;

/// All flow records of one processing run, keyed by flow key
#[derive(Debug, Default)]
pub struct FlowCache {
    records: HashMap<FlowKey, FlowRecord>,
}

impl FlowCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &FlowKey) -> bool {
        self.records.contains_key(key)
    }

    pub fn get(&self, key: &FlowKey) -> Option<&FlowRecord> {
        self.records.get(key)
    }

    pub fn get_mut(&mut self, key: &FlowKey) -> Option<&mut FlowRecord> {
        self.records.get_mut(key)
    }

    /// Store a new record. The key must not be tracked yet.
    pub fn insert(&mut self, key: FlowKey, record: FlowRecord) {
        let previous = self.records.insert(key, record);
        debug_assert!(previous.is_none(), "flow {} inserted twice", key);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FlowKey, &FlowRecord)> {
        self.records.iter()
    }

    /// Records ordered by flow start, then key, for reproducible reports
    pub fn sorted(&self) -> Vec<(&FlowKey, &FlowRecord)> {
        let mut entries: Vec<_> = self.records.iter().collect();
        entries.sort_by(|(ka, ra), (kb, rb)| {
            ra.flow_start()
                .total_cmp(&rb.flow_start())
                .then_with(|| ka.cmp(kb))
        });
        entries
    }
}
