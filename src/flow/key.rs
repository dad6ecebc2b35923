use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use uuid::Uuid;

use crate::models::packet::Packet;

/// Identifier of one directional 5-tuple.
///
/// A name-based (MD5) UUID over the ordered tuple. Only determinism matters
/// here, the digest is not a security boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowKey(Uuid);

impl FlowKey {
    /// Digest of `(src, src_port, dst, dst_port, protocol)` in that order
    pub fn new(
        source_ip: Ipv4Addr,
        source_port: u16,
        destination_ip: Ipv4Addr,
        destination_port: u16,
        protocol: u8,
    ) -> Self {
        let name = format!(
            "{} {} {} {} {}",
            source_ip, source_port, destination_ip, destination_port, protocol
        );
        FlowKey(Uuid::new_v3(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Forward key of a packet and the key its reply traffic would carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowKeys {
    pub forward: FlowKey,
    pub reverse: FlowKey,
}

impl FlowKeys {
    pub fn of(packet: &Packet) -> Self {
        Self {
            forward: FlowKey::new(
                packet.source_ip,
                packet.source_port,
                packet.destination_ip,
                packet.destination_port,
                packet.protocol,
            ),
            reverse: FlowKey::new(
                packet.destination_ip,
                packet.destination_port,
                packet.source_ip,
                packet.source_port,
                packet.protocol,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::packet::{NetworkLayer, TransportTag};

    fn packet(src: [u8; 4], sport: u16, dst: [u8; 4], dport: u16, protocol: u8) -> Packet {
        Packet {
            timestamp: 0.0,
            network: NetworkLayer::Ipv4,
            source_ip: Ipv4Addr::from(src),
            destination_ip: Ipv4Addr::from(dst),
            source_port: sport,
            destination_port: dport,
            protocol,
            length: 40,
            transport: TransportTag::from_protocol(protocol),
        }
    }

    #[test]
    fn test_key_is_deterministic() {
        let a = FlowKey::new(Ipv4Addr::new(10, 0, 0, 1), 1234, Ipv4Addr::new(10, 0, 0, 2), 80, 6);
        let b = FlowKey::new(Ipv4Addr::new(10, 0, 0, 1), 1234, Ipv4Addr::new(10, 0, 0, 2), 80, 6);
        assert_eq!(a, b);
        assert_eq!(a.to_string().len(), 32);
    }

    #[test]
    fn test_reverse_key_mirrors_swapped_tuple() {
        let tuples = [
            ([10, 0, 0, 1], 1234, [10, 0, 0, 2], 80, 6),
            ([192, 168, 1, 7], 53, [8, 8, 8, 8], 53, 17),
            ([172, 16, 0, 1], 0, [172, 16, 0, 9], 0, 47),
            ([1, 2, 3, 4], 65535, [1, 2, 3, 4], 1, 6),
        ];

        for (src, sport, dst, dport, proto) in tuples {
            let keys = FlowKeys::of(&packet(src, sport, dst, dport, proto));
            let swapped = FlowKeys::of(&packet(dst, dport, src, sport, proto));
            assert_eq!(keys.reverse, swapped.forward);
            assert_eq!(keys.forward, swapped.reverse);
        }
    }

    #[test]
    fn test_direction_and_protocol_change_the_key() {
        let keys = FlowKeys::of(&packet([10, 0, 0, 1], 1234, [10, 0, 0, 2], 80, 6));
        assert_ne!(keys.forward, keys.reverse);

        let udp = FlowKeys::of(&packet([10, 0, 0, 1], 1234, [10, 0, 0, 2], 80, 17));
        assert_ne!(keys.forward, udp.forward);
    }

    #[test]
    fn test_field_boundaries_do_not_collide() {
        // "1.1.1.1 11 ..." vs "1.1.1.11 1 ..." differ only by where the separator falls
        let a = FlowKey::new(Ipv4Addr::new(1, 1, 1, 1), 11, Ipv4Addr::new(2, 2, 2, 2), 80, 6);
        let b = FlowKey::new(Ipv4Addr::new(1, 1, 1, 11), 1, Ipv4Addr::new(2, 2, 2, 2), 80, 6);
        assert_ne!(a, b);
    }
}
