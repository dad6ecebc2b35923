//! Organises decoded IPv4 packets into flow records.
//!
//! [`flow`] holds the accounting core: classification, flow keys, the flow
//! cache and the record state machine. [`capture`] decodes frames and feeds
//! them from capture files or live interfaces, [`report`] renders the cache
//! once a run is over.

pub mod capture;
pub mod flow;
pub mod models;
pub mod report;
pub mod utils;
