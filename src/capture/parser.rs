use log::{trace, log_enabled, Level};
use pnet::packet::{
    ethernet::{EtherType, EtherTypes, EthernetPacket},
    ipv4::Ipv4Packet,
    tcp::TcpPacket,
    udp::UdpPacket,
    Packet as PnetPacket,
};

use crate::models::packet::{NetworkLayer, Packet, TransportTag};
use crate::utils::error::{AppError, AppResult};

const SLL_HEADER_LEN: usize = 16;

/// Framing of the captured bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkLayer {
    Ethernet,
    /// Linux cooked capture (`any` device)
    LinuxSll,
    /// Bare IP datagrams
    RawIp,
}

impl LinkLayer {
    /// Map a pcap DLT/LINKTYPE value
    pub fn from_linktype(linktype: pcap::Linktype) -> AppResult<Self> {
        match linktype.0 {
            1 => Ok(LinkLayer::Ethernet),
            113 => Ok(LinkLayer::LinuxSll),
            12 | 14 | 101 | 228 => Ok(LinkLayer::RawIp),
            other => Err(AppError::CaptureError(format!(
                "Unsupported link type {} ({})",
                other,
                linktype.get_name().unwrap_or_else(|_| "unknown".to_string())
            ))),
        }
    }
}

/// Decodes captured frames into packets for the flow core
pub struct PacketParser {
    link: LinkLayer,
}

impl PacketParser {
    /// Create a new packet parser for a link layer
    pub fn new(link: LinkLayer) -> Self {
        Self { link }
    }

    /// Decode one captured frame
    pub fn parse_packet(&self, timestamp: f64, data: &[u8]) -> AppResult<Packet> {
        if log_enabled!(Level::Trace) {
            trace!("Parsing {:?} frame at {:.6}, size: {} bytes", self.link, timestamp, data.len());
        }

        match self.link {
            LinkLayer::Ethernet => {
                let eth_packet = EthernetPacket::new(data)
                    .ok_or_else(|| AppError::PacketParsingError("Failed to parse Ethernet frame".to_string()))?;
                self.parse_ethertype(timestamp, eth_packet.get_ethertype(), eth_packet.payload())
            }
            LinkLayer::LinuxSll => {
                if data.len() < SLL_HEADER_LEN {
                    return Err(AppError::PacketParsingError("Failed to parse Linux cooked header".to_string()));
                }
                let protocol = u16::from_be_bytes([data[14], data[15]]);
                self.parse_ethertype(timestamp, EtherType(protocol), &data[SLL_HEADER_LEN..])
            }
            LinkLayer::RawIp => match data.first().map(|b| b >> 4) {
                Some(4) => self.parse_ipv4(timestamp, data),
                Some(6) => Ok(Packet::non_ipv4(timestamp, NetworkLayer::Ipv6)),
                _ => Err(AppError::PacketParsingError("Unknown IP version in raw frame".to_string())),
            },
        }
    }

    fn parse_ethertype(&self, timestamp: f64, ethertype: EtherType, payload: &[u8]) -> AppResult<Packet> {
        match ethertype {
            EtherTypes::Ipv4 => self.parse_ipv4(timestamp, payload),
            EtherTypes::Ipv6 => Ok(Packet::non_ipv4(timestamp, NetworkLayer::Ipv6)),
            EtherTypes::Arp => Ok(Packet::non_ipv4(timestamp, NetworkLayer::Arp)),
            other => Ok(Packet::non_ipv4(timestamp, NetworkLayer::Other(other.0))),
        }
    }

    /// Parse IPv4 packet
    fn parse_ipv4(&self, timestamp: f64, data: &[u8]) -> AppResult<Packet> {
        let ipv4_packet = Ipv4Packet::new(data)
            .ok_or_else(|| AppError::PacketParsingError("Failed to parse IPv4 packet".to_string()))?;

        if ipv4_packet.get_version() != 4 || ipv4_packet.get_header_length() < 5 {
            return Err(AppError::PacketParsingError(format!(
                "Malformed IPv4 header (version {}, IHL {})",
                ipv4_packet.get_version(),
                ipv4_packet.get_header_length()
            )));
        }

        let protocol = ipv4_packet.get_next_level_protocol().0;
        let transport = TransportTag::from_protocol(protocol);
        let header_len = ipv4_packet.get_header_length() as usize * 4;

        // Offloaded captures can carry a zero total length
        let (length, payload) = match ipv4_packet.get_total_length() {
            0 => (
                data.len().min(u16::MAX as usize) as u16,
                data.get(header_len..).unwrap_or(&[]),
            ),
            total => (total, ipv4_packet.payload()),
        };

        let (source_port, destination_port) = self.parse_ports(transport, payload)?;

        if log_enabled!(Level::Trace) {
            trace!(
                "IPv4 - {}:{} -> {}:{}, proto: {}, length: {}",
                ipv4_packet.get_source(),
                source_port,
                ipv4_packet.get_destination(),
                destination_port,
                transport,
                length
            );
        }

        Ok(Packet {
            timestamp,
            network: NetworkLayer::Ipv4,
            source_ip: ipv4_packet.get_source(),
            destination_ip: ipv4_packet.get_destination(),
            source_port,
            destination_port,
            protocol,
            length,
            transport,
        })
    }

    fn parse_ports(&self, transport: TransportTag, data: &[u8]) -> AppResult<(u16, u16)> {
        match transport {
            TransportTag::Tcp => {
                let tcp_packet = TcpPacket::new(data)
                    .ok_or_else(|| AppError::PacketParsingError("Failed to parse TCP packet".to_string()))?;
                Ok((tcp_packet.get_source(), tcp_packet.get_destination()))
            }
            TransportTag::Udp => {
                let udp_packet = UdpPacket::new(data)
                    .ok_or_else(|| AppError::PacketParsingError("Failed to parse UDP packet".to_string()))?;
                Ok((udp_packet.get_source(), udp_packet.get_destination()))
            }
            _ => Ok((0, 0)),
        }
    }
}
