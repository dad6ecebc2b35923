use std::fmt;

use crate::models::packet::{NetworkLayer, Packet, TransportTag};

/// Why a packet was left out of flow accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Network layer is not IPv4
    NotIpv4(NetworkLayer),
    /// Transport is excluded from accounting
    ExcludedTransport(TransportTag),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotIpv4(NetworkLayer::Ipv6) => write!(f, "IPv6"),
            RejectReason::NotIpv4(NetworkLayer::Arp) => write!(f, "ARP"),
            RejectReason::NotIpv4(NetworkLayer::Other(ethertype)) => write!(f, "EtherType 0x{:04x}", ethertype),
            RejectReason::NotIpv4(NetworkLayer::Ipv4) => write!(f, "IPv4"),
            RejectReason::ExcludedTransport(tag) => write!(f, "{}", tag),
        }
    }
}

/// Classifier verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

/// Decide whether a packet takes part in flow accounting
pub fn classify(packet: &Packet) -> Verdict {
    if packet.network != NetworkLayer::Ipv4 {
        return Verdict::Reject(RejectReason::NotIpv4(packet.network));
    }

    match packet.transport {
        TransportTag::Icmp | TransportTag::Igmp | TransportTag::Pim | TransportTag::Ipv6InIp => {
            Verdict::Reject(RejectReason::ExcludedTransport(packet.transport))
        }
        TransportTag::Tcp | TransportTag::Udp | TransportTag::Other(_) => Verdict::Accept,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ipv4_packet(transport: TransportTag) -> Packet {
        Packet {
            timestamp: 1.0,
            network: NetworkLayer::Ipv4,
            source_ip: Ipv4Addr::new(10, 0, 0, 1),
            destination_ip: Ipv4Addr::new(10, 0, 0, 2),
            source_port: 1000,
            destination_port: 80,
            protocol: 6,
            length: 60,
            transport,
        }
    }

    #[test]
    fn test_accepts_tcp_udp_and_other_transports() {
        assert_eq!(classify(&ipv4_packet(TransportTag::Tcp)), Verdict::Accept);
        assert_eq!(classify(&ipv4_packet(TransportTag::Udp)), Verdict::Accept);
        assert_eq!(classify(&ipv4_packet(TransportTag::Other(47))), Verdict::Accept);
    }

    #[test]
    fn test_rejects_excluded_transports() {
        for tag in [TransportTag::Icmp, TransportTag::Igmp, TransportTag::Pim, TransportTag::Ipv6InIp] {
            assert_eq!(
                classify(&ipv4_packet(tag)),
                Verdict::Reject(RejectReason::ExcludedTransport(tag))
            );
        }
    }

    #[test]
    fn test_rejects_non_ipv4() {
        let packet = Packet::non_ipv4(1.0, NetworkLayer::Ipv6);
        assert_eq!(classify(&packet), Verdict::Reject(RejectReason::NotIpv4(NetworkLayer::Ipv6)));

        let packet = Packet::non_ipv4(1.0, NetworkLayer::Arp);
        assert_eq!(classify(&packet), Verdict::Reject(RejectReason::NotIpv4(NetworkLayer::Arp)));
    }

    #[test]
    fn test_reject_reasons_are_distinct_keys() {
        use std::collections::HashSet;

        let reasons: HashSet<RejectReason> = [
            RejectReason::NotIpv4(NetworkLayer::Ipv6),
            RejectReason::NotIpv4(NetworkLayer::Arp),
            RejectReason::NotIpv4(NetworkLayer::Other(0x88cc)),
            RejectReason::NotIpv4(NetworkLayer::Ipv6),
            RejectReason::ExcludedTransport(TransportTag::Icmp),
        ]
        .into_iter()
        .collect();

        assert_eq!(reasons.len(), 4);
        assert!(reasons.contains(&RejectReason::NotIpv4(NetworkLayer::Other(0x88cc))));
    }

    #[test]
    fn test_classification_is_idempotent() {
        let packet = ipv4_packet(TransportTag::Pim);
        assert_eq!(classify(&packet), classify(&packet));
    }
}
