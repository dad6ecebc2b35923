use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::{debug, error, info, trace, warn};
use pcap::{Active, Capture, Device, PacketHeader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::capture::parser::{LinkLayer, PacketParser};
use crate::flow::FlowContext;
use crate::models::config::{AppConfig, PacketSource};

/// Consecutive hard capture errors tolerated before a live capture gives up
const MAX_CONSECUTIVE_ERRORS: u32 = 5;

/// Drives a packet source through the flow core
pub struct CaptureManager {
    /// Application configuration
    config: AppConfig,
}

impl CaptureManager {
    /// Create a new capture manager
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Process the configured source until it is exhausted or interrupted
    pub async fn run(&self) -> Result<FlowContext> {
        let ctx = match &self.config.source {
            PacketSource::File(path) => self.process_file(path)?,
            PacketSource::Interface(name) => self.process_live(name).await?,
        };

        Self::log_summary(&ctx);
        Ok(ctx)
    }

    /// Read every frame of an offline capture file
    pub fn process_file(&self, path: &Path) -> Result<FlowContext> {
        info!("Reading packets from {}", path.display());

        let mut capture = Capture::from_file(path)
            .with_context(|| format!("Failed to open capture file {}", path.display()))?;

        if let Some(filter) = &self.config.filter {
            capture
                .filter(filter, true)
                .with_context(|| format!("Failed to apply filter: {}", filter))?;
            info!("Filter applied: {}", filter);
        }

        let parser = PacketParser::new(LinkLayer::from_linktype(capture.get_datalink())?);
        let mut ctx = self.new_context();

        loop {
            match capture.next_packet() {
                Ok(packet) => Self::handle_frame(&mut ctx, &parser, packet.header, packet.data),
                Err(pcap::Error::NoMorePackets) => break,
                Err(e) => {
                    // Truncated files end this way; keep what was read
                    error!("Error reading {}: {}, stopping", path.display(), e);
                    break;
                }
            }
        }

        info!("Finished reading {}", path.display());
        Ok(ctx)
    }

    /// Capture from an interface until Ctrl-C or a fatal capture error
    pub async fn process_live(&self, interface: &str) -> Result<FlowContext> {
        let capture = self.open_live(interface)?;
        let parser = PacketParser::new(LinkLayer::from_linktype(capture.get_datalink())?);
        let ctx = self.new_context();

        let running = Arc::new(AtomicBool::new(true));
        let worker_running = running.clone();
        let interface_name = interface.to_string();
        let mut worker = tokio::task::spawn_blocking(move || {
            Self::run_capture(capture, parser, ctx, worker_running, interface_name)
        });

        info!("Capturing on {}, press Ctrl-C to stop", interface);

        tokio::select! {
            result = &mut worker => {
                warn!("Capture on {} ended before an interrupt was received", interface);
                return result.map_err(|e| anyhow!("Capture worker failed: {}", e));
            }
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => info!("SIGINT (Ctrl-c) detected. Exiting..."),
                Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
            },
        }

        running.store(false, Ordering::SeqCst);
        worker.await.map_err(|e| anyhow!("Capture worker failed: {}", e))
    }

    /// Open and configure a live capture handle
    fn open_live(&self, interface: &str) -> Result<Capture<Active>> {
        let device = match Device::list() {
            Ok(devices) => match devices.into_iter().find(|d| d.name == interface) {
                Some(device) => {
                    debug!("Found device in device list: {}", device.name);
                    device
                }
                None => return Err(anyhow!("Interface {} not found", interface)),
            },
            Err(e) => {
                warn!("Failed to list devices: {}, opening {} directly", e, interface);
                Device::from(interface)
            }
        };

        info!(
            "Opening {} (promiscuous: {}, snaplen: {}, timeout: {}ms)",
            device.name, self.config.promiscuous, self.config.snaplen, self.config.read_timeout_ms()
        );

        let mut capture = Capture::from_device(device)
            .with_context(|| format!("Failed to create capture from device {}", interface))?
            .promisc(self.config.promiscuous)
            .snaplen(self.config.snaplen)
            .timeout(self.config.read_timeout_ms())
            .open()
            .with_context(|| format!("Failed to open capture on {}. Capturing usually requires elevated privileges", interface))?;

        if let Some(filter) = &self.config.filter {
            capture
                .filter(filter, true)
                .with_context(|| format!("Failed to apply filter: {}", filter))?;
            info!("Filter applied: {}", filter);
        }

        Ok(capture)
    }

    /// Blocking capture loop; hands the context back once `running` is cleared
    fn run_capture(
        mut capture: Capture<Active>,
        parser: PacketParser,
        mut ctx: FlowContext,
        running: Arc<AtomicBool>,
        interface_name: String,
    ) -> FlowContext {
        info!("Starting capture loop for interface: {}", interface_name);

        let mut consecutive_errors = 0;

        while running.load(Ordering::SeqCst) {
            match capture.next_packet() {
                Ok(packet) => {
                    consecutive_errors = 0;
                    Self::handle_frame(&mut ctx, &parser, packet.header, packet.data);
                }
                Err(pcap::Error::TimeoutExpired) => {
                    trace!("Packet capture timed out, continuing");
                }
                Err(e) => {
                    error!("Error capturing packet: {}", e);
                    consecutive_errors += 1;

                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        error!("Too many consecutive errors ({}), stopping capture", consecutive_errors);
                        break;
                    }

                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }

        info!("Capture loop stopped for interface: {}", interface_name);
        ctx
    }

    fn new_context(&self) -> FlowContext {
        let mut ctx = FlowContext::new(self.config.mode);
        ctx.stats_mut().start_time = Some(Utc::now());
        ctx
    }

    /// Decode one frame and feed it to the flow core
    fn handle_frame(ctx: &mut FlowContext, parser: &PacketParser, header: &PacketHeader, data: &[u8]) {
        let timestamp = header.ts.tv_sec as f64 + header.ts.tv_usec as f64 / 1_000_000.0;

        let stats = ctx.stats_mut();
        stats.total_frames += 1;
        stats.total_bytes += data.len();

        if header.caplen as usize != data.len() {
            warn!("Packet length mismatch: header says {} but data is {} bytes", header.caplen, data.len());
        }

        match parser.parse_packet(timestamp, data) {
            Ok(packet) => {
                ctx.process(&packet);
            }
            Err(e) => {
                debug!("Skipping frame at {:.6}: {}", timestamp, e);
                ctx.stats_mut().decode_errors += 1;
            }
        }
    }

    fn log_summary(ctx: &FlowContext) {
        let stats = ctx.stats();
        info!(
            "Processed {} frames ({} bytes): {} accepted, {} rejected, {} undecodable",
            stats.total_frames,
            stats.total_bytes,
            stats.accepted,
            stats.total_rejected(),
            stats.decode_errors
        );
        for (reason, count) in &stats.rejected {
            debug!("Rejected {} packet(s): {}", count, reason);
        }
        info!("{} flow records in {} mode", ctx.cache().len(), ctx.mode());
    }
}
