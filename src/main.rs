use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use flowrecorder::capture::manager::CaptureManager;
use flowrecorder::models::config::{AppConfig, FlowMode, OutputFormat, PacketSource};
use flowrecorder::models::interface;
use flowrecorder::report;
use flowrecorder::utils::logging;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Organises captured packets into unidirectional or bidirectional flow records")]
struct Args {
    /// The directionality of measurement: u (unidirectional) or b (bidirectional)
    #[clap(short, long)]
    direction: Option<String>,

    /// The interface for live packet capture
    #[clap(short, long, conflicts_with = "file", required_unless_present_any = ["file", "list_interfaces"])]
    interface: Option<String>,

    /// PCAP file for parsing
    #[clap(short, long)]
    file: Option<PathBuf>,

    /// List capture interfaces and exit
    #[clap(long)]
    list_interfaces: bool,

    /// Enable promiscuous mode
    #[clap(short = 'P', long)]
    promiscuous: bool,

    /// Snapshot length for live capture
    #[clap(long, default_value = "65535")]
    snaplen: i32,

    /// Read timeout of the live capture handle in milliseconds (at least 1)
    #[clap(long, default_value = "100", value_parser = clap::value_parser!(i32).range(1..))]
    timeout_ms: i32,

    /// BPF filter expression
    #[clap(long)]
    filter: Option<String>,

    /// Report format
    #[clap(long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[clap(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger with specified level
    logging::init_logger(logging::get_log_level(&args.log_level));

    info!("Starting flowrecorder v{}", env!("CARGO_PKG_VERSION"));

    if args.list_interfaces {
        for iface in interface::list_interfaces() {
            println!("{}", iface);
        }
        return Ok(());
    }

    let source = match (args.file, args.interface) {
        (Some(path), _) => PacketSource::File(path),
        (None, Some(name)) => PacketSource::Interface(name),
        (None, None) => bail!("Either --file or --interface is required"),
    };

    let config = AppConfig {
        mode: FlowMode::from_flag(args.direction.as_deref()),
        source,
        promiscuous: args.promiscuous,
        snaplen: args.snaplen,
        timeout_ms: args.timeout_ms,
        filter: args.filter,
        format: args.format,
        output: args.output,
    };

    let manager = CaptureManager::new(config.clone());
    let ctx = manager.run().await?;
    let (cache, stats) = ctx.finish();

    if let (Some(start), Some(end)) = (stats.start_time, stats.end_time) {
        info!("Processing took {} ms", end.signed_duration_since(start).num_milliseconds());
    }

    info!(
        "Writing {} flow records as {:?}{}",
        cache.len(),
        config.format,
        config
            .output
            .as_ref()
            .map(|p| format!(" to {}", p.display()))
            .unwrap_or_default()
    );

    report::write_report(&cache, config.mode, config.format, config.output.as_deref())
        .context("Failed to write flow report")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_must_be_positive() {
        for value in ["0", "-5"] {
            let parsed = Args::try_parse_from(["flowrecorder", "-i", "eth0", "--timeout-ms", value]);
            assert!(parsed.is_err(), "timeout {} should be refused", value);
        }

        let args = Args::try_parse_from(["flowrecorder", "-i", "eth0", "--timeout-ms", "250"]).unwrap();
        assert_eq!(args.timeout_ms, 250);

        let args = Args::try_parse_from(["flowrecorder", "-f", "capture.pcap"]).unwrap();
        assert_eq!(args.timeout_ms, 100);
    }
}
