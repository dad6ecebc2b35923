//! Synthetic frames for decoder and driver tests.

use pnet::packet::{
    ethernet::{EtherType, MutableEthernetPacket},
    ip::{IpNextHeaderProtocol, IpNextHeaderProtocols},
    ipv4::MutableIpv4Packet,
    tcp::MutableTcpPacket,
    udp::MutableUdpPacket,
};
use pnet::util::MacAddr;
use std::net::Ipv4Addr;

const IPV4_HEADER_LEN: usize = 20;

/// An IPv4 datagram with a TCP/UDP header (ports filled in) or an opaque
/// 8-byte transport header, followed by `payload_len` zero bytes
pub fn ipv4_datagram(
    src: Ipv4Addr,
    src_port: u16,
    dst: Ipv4Addr,
    dst_port: u16,
    protocol: IpNextHeaderProtocol,
    payload_len: usize,
) -> Vec<u8> {
    let transport_len = if protocol == IpNextHeaderProtocols::Tcp { 20 } else { 8 };
    let total_len = IPV4_HEADER_LEN + transport_len + payload_len;
    let mut buf = vec![0u8; total_len];

    {
        let mut ip = MutableIpv4Packet::new(&mut buf[..]).unwrap();
        ip.set_version(4);
        ip.set_header_length(5);
        ip.set_total_length(total_len as u16);
        ip.set_ttl(64);
        ip.set_next_level_protocol(protocol);
        ip.set_source(src);
        ip.set_destination(dst);
    }

    let transport = &mut buf[IPV4_HEADER_LEN..];
    if protocol == IpNextHeaderProtocols::Tcp {
        let mut tcp = MutableTcpPacket::new(transport).unwrap();
        tcp.set_source(src_port);
        tcp.set_destination(dst_port);
        tcp.set_data_offset(5);
    } else if protocol == IpNextHeaderProtocols::Udp {
        let mut udp = MutableUdpPacket::new(transport).unwrap();
        udp.set_source(src_port);
        udp.set_destination(dst_port);
        udp.set_length((transport_len + payload_len) as u16);
    }

    buf
}

/// Wrap a payload in an Ethernet II header
pub fn ethernet_frame(ethertype: EtherType, payload: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; 14 + payload.len()];
    {
        let mut eth = MutableEthernetPacket::new(&mut buf[..]).unwrap();
        eth.set_source(MacAddr::new(0x02, 0, 0, 0, 0, 1));
        eth.set_destination(MacAddr::new(0x02, 0, 0, 0, 0, 2));
        eth.set_ethertype(ethertype);
    }
    buf[14..].copy_from_slice(payload);
    buf
}
