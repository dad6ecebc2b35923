use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Network layer carried by a captured frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkLayer {
    Ipv4,
    Ipv6,
    Arp,
    /// Any other EtherType
    Other(u16),
}

/// Protocol found in the IPv4 payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportTag {
    Tcp,
    Udp,
    Icmp,
    Igmp,
    Pim,
    /// IPv6 encapsulated in IPv4 (protocol 41)
    Ipv6InIp,
    Other(u8),
}

impl TransportTag {
    /// Map an IP protocol number to its tag
    pub fn from_protocol(protocol: u8) -> Self {
        match protocol {
            1 => TransportTag::Icmp,
            2 => TransportTag::Igmp,
            6 => TransportTag::Tcp,
            17 => TransportTag::Udp,
            41 => TransportTag::Ipv6InIp,
            103 => TransportTag::Pim,
            other => TransportTag::Other(other),
        }
    }
}

impl fmt::Display for TransportTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportTag::Tcp => write!(f, "TCP"),
            TransportTag::Udp => write!(f, "UDP"),
            TransportTag::Icmp => write!(f, "ICMP"),
            TransportTag::Igmp => write!(f, "IGMP"),
            TransportTag::Pim => write!(f, "PIM"),
            TransportTag::Ipv6InIp => write!(f, "IPv6-in-IP"),
            TransportTag::Other(p) => write!(f, "IP({})", p),
        }
    }
}

/// A decoded packet as seen by the flow core.
///
/// Address, port, protocol and length fields are only meaningful when
/// `network` is [`NetworkLayer::Ipv4`]; the decoder leaves them zeroed
/// otherwise. Ports are zero for transports without a port pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// Capture time in seconds since the epoch
    pub timestamp: f64,

    /// Network layer of the frame
    pub network: NetworkLayer,

    /// Source IPv4 address
    pub source_ip: Ipv4Addr,

    /// Destination IPv4 address
    pub destination_ip: Ipv4Addr,

    /// Source transport port
    pub source_port: u16,

    /// Destination transport port
    pub destination_port: u16,

    /// IP protocol number
    pub protocol: u8,

    /// Total IP length in bytes, from the IPv4 header
    pub length: u16,

    /// Transport or encapsulated protocol
    pub transport: TransportTag,
}

impl Packet {
    /// A frame that carries no IPv4 payload
    pub fn non_ipv4(timestamp: f64, network: NetworkLayer) -> Self {
        Self {
            timestamp,
            network,
            source_ip: Ipv4Addr::UNSPECIFIED,
            destination_ip: Ipv4Addr::UNSPECIFIED,
            source_port: 0,
            destination_port: 0,
            protocol: 0,
            length: 0,
            transport: TransportTag::Other(0),
        }
    }
}
