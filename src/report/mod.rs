//! Rendering of the final flow cache.
//!
//! Rows keep the column names the flow recorder has always printed
//! (`flowStart`, `BI_pktTotalCount`, ...), so downstream scripts can rely
//! on them regardless of the output format.

pub mod export;
pub mod table;

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, IsTerminal};
use std::path::Path;
use termcolor::{ColorChoice, NoColor, StandardStream};

use crate::flow::cache::FlowCache;
use crate::flow::key::FlowKey;
use crate::flow::record::{FlowCounters, FlowRecord, FlowStats};
use crate::models::config::{FlowMode, OutputFormat};
use crate::utils::error::AppResult;

/// A report row that can also be shown as a `name: value` block
pub trait FlowRow: Serialize {
    fn flow_id(&self) -> &str;

    /// Display fields in column order, flow id excluded
    fn fields(&self) -> Vec<(&'static str, String)>;
}

/// One unidirectional flow record
#[derive(Debug, Clone, Serialize)]
pub struct UniflowRow {
    pub flow_id: String,
    pub src_ip: String,
    pub src_port: u16,
    pub dst_ip: String,
    pub dst_port: u16,
    pub proto: u8,
    #[serde(rename = "flowStart")]
    pub flow_start: f64,
    #[serde(rename = "flowEnd")]
    pub flow_end: f64,
    #[serde(rename = "flowDuration")]
    pub flow_duration: f64,
    #[serde(rename = "pktTotalCount")]
    pub pkt_total_count: u64,
    #[serde(rename = "octetTotalCount")]
    pub octet_total_count: u64,
}

/// One bidirectional flow record
#[derive(Debug, Clone, Serialize)]
pub struct BiflowRow {
    pub flow_id: String,
    pub bwd_pkt_flow_id: String,
    pub src_ip: String,
    pub dst_ip: String,
    pub src_port: u16,
    pub dst_port: u16,
    pub proto: u8,
    #[serde(rename = "BI_flowStart")]
    pub bi_flow_start: f64,
    #[serde(rename = "BI_flowEnd")]
    pub bi_flow_end: f64,
    #[serde(rename = "BI_flowDuration")]
    pub bi_flow_duration: f64,
    #[serde(rename = "BI_pktTotalCount")]
    pub bi_pkt_total_count: u64,
    #[serde(rename = "BI_octetTotalCount")]
    pub bi_octet_total_count: u64,
    #[serde(rename = "F_flowStart")]
    pub f_flow_start: f64,
    #[serde(rename = "F_flowEnd")]
    pub f_flow_end: f64,
    #[serde(rename = "F_flowDuration")]
    pub f_flow_duration: f64,
    #[serde(rename = "F_pktTotalCount")]
    pub f_pkt_total_count: u64,
    #[serde(rename = "F_octetTotalCount")]
    pub f_octet_total_count: u64,
    #[serde(rename = "B_flowStart")]
    pub b_flow_start: f64,
    #[serde(rename = "B_flowEnd")]
    pub b_flow_end: f64,
    #[serde(rename = "B_flowDuration")]
    pub b_flow_duration: f64,
    #[serde(rename = "B_pktTotalCount")]
    pub b_pkt_total_count: u64,
    #[serde(rename = "B_octetTotalCount")]
    pub b_octet_total_count: u64,
}

impl UniflowRow {
    fn new(key: &FlowKey, record: &FlowRecord, c: &FlowCounters) -> Self {
        Self {
            flow_id: key.to_string(),
            src_ip: record.source_ip().to_string(),
            src_port: record.source_port(),
            dst_ip: record.destination_ip().to_string(),
            dst_port: record.destination_port(),
            proto: record.protocol(),
            flow_start: c.flow_start,
            flow_end: c.flow_end,
            flow_duration: c.flow_duration,
            pkt_total_count: c.pkt_total_count,
            octet_total_count: c.octet_total_count,
        }
    }
}

impl BiflowRow {
    fn new(
        key: &FlowKey,
        record: &FlowRecord,
        reverse_key: &FlowKey,
        bi: &FlowCounters,
        f: &FlowCounters,
        b: &FlowCounters,
    ) -> Self {
        Self {
            flow_id: key.to_string(),
            bwd_pkt_flow_id: reverse_key.to_string(),
            src_ip: record.source_ip().to_string(),
            dst_ip: record.destination_ip().to_string(),
            src_port: record.source_port(),
            dst_port: record.destination_port(),
            proto: record.protocol(),
            bi_flow_start: bi.flow_start,
            bi_flow_end: bi.flow_end,
            bi_flow_duration: bi.flow_duration,
            bi_pkt_total_count: bi.pkt_total_count,
            bi_octet_total_count: bi.octet_total_count,
            f_flow_start: f.flow_start,
            f_flow_end: f.flow_end,
            f_flow_duration: f.flow_duration,
            f_pkt_total_count: f.pkt_total_count,
            f_octet_total_count: f.octet_total_count,
            b_flow_start: b.flow_start,
            b_flow_end: b.flow_end,
            b_flow_duration: b.flow_duration,
            b_pkt_total_count: b.pkt_total_count,
            b_octet_total_count: b.octet_total_count,
        }
    }
}

// Zero readings are shown as NaN, like the original tabular print
fn seconds(value: f64) -> String {
    if value == 0.0 {
        "NaN".to_string()
    } else {
        format!("{:.6}", value)
    }
}

fn count(value: u64) -> String {
    if value == 0 {
        "NaN".to_string()
    } else {
        value.to_string()
    }
}

impl FlowRow for UniflowRow {
    fn flow_id(&self) -> &str {
        &self.flow_id
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("src_ip", self.src_ip.clone()),
            ("src_port", self.src_port.to_string()),
            ("dst_ip", self.dst_ip.clone()),
            ("dst_port", self.dst_port.to_string()),
            ("proto", self.proto.to_string()),
            ("flowStart", seconds(self.flow_start)),
            ("flowEnd", seconds(self.flow_end)),
            ("flowDuration", seconds(self.flow_duration)),
            ("pktTotalCount", count(self.pkt_total_count)),
            ("octetTotalCount", count(self.octet_total_count)),
        ]
    }
}

impl FlowRow for BiflowRow {
    fn flow_id(&self) -> &str {
        &self.flow_id
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("bwd_pkt_flow_id", self.bwd_pkt_flow_id.clone()),
            ("src_ip", self.src_ip.clone()),
            ("dst_ip", self.dst_ip.clone()),
            ("src_port", self.src_port.to_string()),
            ("dst_port", self.dst_port.to_string()),
            ("proto", self.proto.to_string()),
            ("BI_flowStart", seconds(self.bi_flow_start)),
            ("BI_flowEnd", seconds(self.bi_flow_end)),
            ("BI_flowDuration", seconds(self.bi_flow_duration)),
            ("BI_pktTotalCount", count(self.bi_pkt_total_count)),
            ("BI_octetTotalCount", count(self.bi_octet_total_count)),
            ("F_flowStart", seconds(self.f_flow_start)),
            ("F_flowEnd", seconds(self.f_flow_end)),
            ("F_flowDuration", seconds(self.f_flow_duration)),
            ("F_pktTotalCount", count(self.f_pkt_total_count)),
            ("F_octetTotalCount", count(self.f_octet_total_count)),
            ("B_flowStart", seconds(self.b_flow_start)),
            ("B_flowEnd", seconds(self.b_flow_end)),
            ("B_flowDuration", seconds(self.b_flow_duration)),
            ("B_pktTotalCount", count(self.b_pkt_total_count)),
            ("B_octetTotalCount", count(self.b_octet_total_count)),
        ]
    }
}

/// Rows of one run; every record of a run has the run's shape
#[derive(Debug, Clone)]
pub enum FlowTable {
    Uniflow(Vec<UniflowRow>),
    Biflow(Vec<BiflowRow>),
}

impl FlowTable {
    /// Flatten the cache, ordered by flow start then key
    pub fn from_cache(cache: &FlowCache, mode: FlowMode) -> Self {
        let entries = cache.sorted();
        match mode {
            FlowMode::Unidirectional => FlowTable::Uniflow(
                entries
                    .into_iter()
                    .filter_map(|(key, record)| match record.stats() {
                        FlowStats::Uniflow(c) => Some(UniflowRow::new(key, record, c)),
                        FlowStats::Biflow { .. } => None,
                    })
                    .collect(),
            ),
            FlowMode::Bidirectional => FlowTable::Biflow(
                entries
                    .into_iter()
                    .filter_map(|(key, record)| match record.stats() {
                        FlowStats::Biflow { combined, forward, backward, reverse_key } => {
                            Some(BiflowRow::new(key, record, reverse_key, combined, forward, backward))
                        }
                        FlowStats::Uniflow(_) => None,
                    })
                    .collect(),
            ),
        }
    }
}

/// Write the report for a finished run to `output`, or stdout
pub fn write_report(cache: &FlowCache, mode: FlowMode, format: OutputFormat, output: Option<&Path>) -> AppResult<()> {
    let table = FlowTable::from_cache(cache, mode);

    match (format, output) {
        (OutputFormat::Table, None) => {
            let mut stdout = StandardStream::stdout(color_choice(io::stdout().is_terminal()));
            write_table(&table, &mut stdout)?;
        }
        (OutputFormat::Table, Some(path)) => {
            let mut file = NoColor::new(BufWriter::new(File::create(path)?));
            write_table(&table, &mut file)?;
        }
        (OutputFormat::Csv, None) => write_csv(&table, io::stdout().lock())?,
        (OutputFormat::Csv, Some(path)) => write_csv(&table, BufWriter::new(File::create(path)?))?,
        (OutputFormat::Json, None) => write_json(&table, io::stdout().lock())?,
        (OutputFormat::Json, Some(path)) => write_json(&table, BufWriter::new(File::create(path)?))?,
    }

    Ok(())
}

/// Colors only when stdout is a terminal; redirected reports stay plain text
fn color_choice(is_terminal: bool) -> ColorChoice {
    if is_terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn write_table<W: termcolor::WriteColor>(table: &FlowTable, out: &mut W) -> io::Result<()> {
    match table {
        FlowTable::Uniflow(rows) => table::render(rows, out),
        FlowTable::Biflow(rows) => table::render(rows, out),
    }
}

fn write_csv<W: io::Write>(table: &FlowTable, out: W) -> AppResult<()> {
    match table {
        FlowTable::Uniflow(rows) => export::write_csv(rows, out),
        FlowTable::Biflow(rows) => export::write_csv(rows, out),
    }
}

fn write_json<W: io::Write>(table: &FlowTable, out: W) -> AppResult<()> {
    match table {
        FlowTable::Uniflow(rows) => export::write_json(rows, out),
        FlowTable::Biflow(rows) => export::write_json(rows, out),
    }
}
