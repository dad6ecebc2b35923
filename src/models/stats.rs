use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use chrono::{DateTime, Utc};

/// Statistics for one processing run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProcessingStats {
    /// Frames pulled from the packet source
    pub total_frames: usize,

    /// Captured bytes across all frames
    pub total_bytes: usize,

    /// Frames that could not be decoded
    pub decode_errors: usize,

    /// Packets handed to the flow builder
    pub accepted: usize,

    /// Rejected packets per reason
    pub rejected: HashMap<String, usize>,

    /// Flow records created
    pub flows_created: usize,

    /// Run start time
    pub start_time: Option<DateTime<Utc>>,

    /// Run end time
    pub end_time: Option<DateTime<Utc>>,
}

impl ProcessingStats {
    /// Total rejected packets across all reasons
    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }

    /// Count a rejection under its reason
    pub fn record_rejection(&mut self, reason: impl ToString) {
        *self.rejected.entry(reason.to_string()).or_insert(0) += 1;
    }
}
