use serde::Serialize;
use std::net::Ipv4Addr;

use super::key::FlowKey;
use crate::models::packet::Packet;

/// Time span and volume of one stream of packets
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FlowCounters {
    pub flow_start: f64,
    pub flow_end: f64,
    pub flow_duration: f64,
    pub pkt_total_count: u64,
    pub octet_total_count: u64,
}

impl FlowCounters {
    /// Counters opened by a single packet
    pub fn first(timestamp: f64, length: u16) -> Self {
        Self {
            flow_start: timestamp,
            flow_end: timestamp,
            flow_duration: 0.0,
            pkt_total_count: 1,
            octet_total_count: length as u64,
        }
    }

    /// Extend the stream with one more packet.
    ///
    /// Timestamps are taken as-is; an out-of-order capture can leave a
    /// negative duration.
    pub fn extend(&mut self, timestamp: f64, length: u16) {
        self.flow_end = timestamp;
        self.flow_duration = self.flow_end - self.flow_start;
        self.pkt_total_count += 1;
        self.octet_total_count += length as u64;
    }
}

/// Direction of a packet relative to the record it lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDirection {
    Forward,
    Backward,
}

/// Per-mode accounting of a record
#[derive(Debug, Clone, PartialEq)]
pub enum FlowStats {
    /// One directional stream
    Uniflow(FlowCounters),
    /// Both directions of a connection
    Biflow {
        combined: FlowCounters,
        forward: FlowCounters,
        /// All zero until the first reverse packet
        backward: FlowCounters,
        /// Key that reply traffic carries
        reverse_key: FlowKey,
    },
}

/// One tracked flow. The 5-tuple is fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRecord {
    source_ip: Ipv4Addr,
    source_port: u16,
    destination_ip: Ipv4Addr,
    destination_port: u16,
    protocol: u8,
    stats: FlowStats,
}

impl FlowRecord {
    pub fn new_uniflow(packet: &Packet) -> Self {
        Self::with_stats(packet, FlowStats::Uniflow(FlowCounters::first(packet.timestamp, packet.length)))
    }

    pub fn new_biflow(packet: &Packet, reverse_key: FlowKey) -> Self {
        let opened = FlowCounters::first(packet.timestamp, packet.length);
        Self::with_stats(
            packet,
            FlowStats::Biflow {
                combined: opened,
                forward: opened,
                backward: FlowCounters::default(),
                reverse_key,
            },
        )
    }

    fn with_stats(packet: &Packet, stats: FlowStats) -> Self {
        Self {
            source_ip: packet.source_ip,
            source_port: packet.source_port,
            destination_ip: packet.destination_ip,
            destination_port: packet.destination_port,
            protocol: packet.protocol,
            stats,
        }
    }

    /// Account one more packet travelling in `direction`
    pub fn update(&mut self, packet: &Packet, direction: FlowDirection) {
        let (timestamp, length) = (packet.timestamp, packet.length);
        match &mut self.stats {
            FlowStats::Uniflow(counters) => counters.extend(timestamp, length),
            FlowStats::Biflow { combined, forward, backward, .. } => {
                combined.extend(timestamp, length);
                match direction {
                    FlowDirection::Forward => forward.extend(timestamp, length),
                    FlowDirection::Backward => {
                        // First reverse packet, keyed on the count so a t=0 start is set once
                        if backward.pkt_total_count == 0 {
                            *backward = FlowCounters::first(timestamp, length);
                        } else {
                            backward.extend(timestamp, length);
                        }
                    }
                }
            }
        }
    }

    pub fn source_ip(&self) -> Ipv4Addr {
        self.source_ip
    }

    pub fn source_port(&self) -> u16 {
        self.source_port
    }

    pub fn destination_ip(&self) -> Ipv4Addr {
        self.destination_ip
    }

    pub fn destination_port(&self) -> u16 {
        self.destination_port
    }

    pub fn protocol(&self) -> u8 {
        self.protocol
    }

    pub fn stats(&self) -> &FlowStats {
        &self.stats
    }

    /// Start time used to order reports
    pub fn flow_start(&self) -> f64 {
        match &self.stats {
            FlowStats::Uniflow(counters) => counters.flow_start,
            FlowStats::Biflow { combined, .. } => combined.flow_start,
        }
    }
}
