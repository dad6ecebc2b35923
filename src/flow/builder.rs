use log::trace;

use super::cache::FlowCache;
use super::key::FlowKeys;
use super::record::{FlowDirection, FlowRecord};
use crate::models::config::FlowMode;
use crate::models::packet::Packet;

/// What the builder did with a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowUpdate {
    /// A new record was stored under the forward key
    Created,
    /// An existing record was extended in the given direction
    Updated(FlowDirection),
}

/// Create or extend the record a packet belongs to
pub fn record_packet(cache: &mut FlowCache, keys: &FlowKeys, packet: &Packet, mode: FlowMode) -> FlowUpdate {
    let update = match mode {
        FlowMode::Unidirectional => record_uniflow(cache, keys, packet),
        FlowMode::Bidirectional => record_biflow(cache, keys, packet),
    };

    trace!(
        "{:?} flow {} for {}:{} -> {}:{} proto {}",
        update,
        keys.forward,
        packet.source_ip,
        packet.source_port,
        packet.destination_ip,
        packet.destination_port,
        packet.protocol
    );
    update
}

// Each direction is its own flow; the reverse key is never consulted.
fn record_uniflow(cache: &mut FlowCache, keys: &FlowKeys, packet: &Packet) -> FlowUpdate {
    if let Some(record) = cache.get_mut(&keys.forward) {
        record.update(packet, FlowDirection::Forward);
        return FlowUpdate::Updated(FlowDirection::Forward);
    }

    cache.insert(keys.forward, FlowRecord::new_uniflow(packet));
    FlowUpdate::Created
}

fn record_biflow(cache: &mut FlowCache, keys: &FlowKeys, packet: &Packet) -> FlowUpdate {
    if let Some(record) = cache.get_mut(&keys.forward) {
        record.update(packet, FlowDirection::Forward);
        return FlowUpdate::Updated(FlowDirection::Forward);
    }

    if let Some(record) = cache.get_mut(&keys.reverse) {
        record.update(packet, FlowDirection::Backward);
        return FlowUpdate::Updated(FlowDirection::Backward);
    }

    cache.insert(keys.forward, FlowRecord::new_biflow(packet, keys.reverse));
    FlowUpdate::Created
}
