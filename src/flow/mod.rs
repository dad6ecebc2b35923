pub mod builder;
pub mod cache;
pub mod classifier;
pub mod key;
pub mod record;

use log::trace;

use crate::models::config::FlowMode;
use crate::models::packet::Packet;
use crate::models::stats::ProcessingStats;

use builder::FlowUpdate;
use cache::FlowCache;
use classifier::Verdict;
use key::FlowKeys;

/// State of one processing run: the flow cache plus the mode it is built in.
///
/// Packet sources own the context while they feed it and hand it back when
/// they stop, so the cache is only read once writing has ceased.
#[derive(Debug)]
pub struct FlowContext {
    mode: FlowMode,
    cache: FlowCache,
    stats: ProcessingStats,
}

impl FlowContext {
    pub fn new(mode: FlowMode) -> Self {
        Self {
            mode,
            cache: FlowCache::new(),
            stats: ProcessingStats::default(),
        }
    }

    pub fn mode(&self) -> FlowMode {
        self.mode
    }

    pub fn cache(&self) -> &FlowCache {
        &self.cache
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut ProcessingStats {
        &mut self.stats
    }

    /// Classify a decoded packet and, if accepted, fold it into the cache
    pub fn process(&mut self, packet: &Packet) -> Verdict {
        let verdict = classifier::classify(packet);
        match verdict {
            Verdict::Reject(reason) => {
                trace!("Skipping packet at {:.6}: {}", packet.timestamp, reason);
                self.stats.record_rejection(reason);
            }
            Verdict::Accept => {
                let keys = FlowKeys::of(packet);
                self.stats.accepted += 1;
                if builder::record_packet(&mut self.cache, &keys, packet, self.mode) == FlowUpdate::Created {
                    self.stats.flows_created += 1;
                }
            }
        }
        verdict
    }

    /// Finish the run and release the cache for reporting
    pub fn finish(mut self) -> (FlowCache, ProcessingStats) {
        self.stats.end_time = Some(chrono::Utc::now());
        (self.cache, self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::packet::{NetworkLayer, TransportTag};
    use std::net::Ipv4Addr;

    fn packet(transport: TransportTag, timestamp: f64) -> Packet {
        Packet {
            timestamp,
            network: NetworkLayer::Ipv4,
            source_ip: Ipv4Addr::new(192, 168, 0, 10),
            destination_ip: Ipv4Addr::new(192, 168, 0, 1),
            source_port: 0,
            destination_port: 0,
            protocol: match transport {
                TransportTag::Icmp => 1,
                TransportTag::Igmp => 2,
                TransportTag::Pim => 103,
                TransportTag::Ipv6InIp => 41,
                TransportTag::Udp => 17,
                TransportTag::Tcp => 6,
                TransportTag::Other(p) => p,
            },
            length: 84,
            transport,
        }
    }

    #[test]
    fn test_excluded_packets_never_touch_the_cache() {
        for mode in [FlowMode::Unidirectional, FlowMode::Bidirectional] {
            let mut ctx = FlowContext::new(mode);
            for tag in [TransportTag::Icmp, TransportTag::Igmp, TransportTag::Pim, TransportTag::Ipv6InIp] {
                assert!(matches!(ctx.process(&packet(tag, 1.0)), Verdict::Reject(_)));
            }
            ctx.process(&Packet::non_ipv4(1.0, NetworkLayer::Ipv6));

            assert!(ctx.cache().is_empty());
            assert_eq!(ctx.stats().accepted, 0);
            assert_eq!(ctx.stats().total_rejected(), 5);
        }
    }

    #[test]
    fn test_excluded_packets_do_not_mutate_existing_flow() {
        let mut ctx = FlowContext::new(FlowMode::Unidirectional);
        ctx.process(&packet(TransportTag::Other(47), 1.0));
        let before = ctx.cache().iter().next().map(|(_, r)| r.clone()).unwrap();

        // Same addresses and ports, excluded transport with a matching protocol number
        let mut excluded = packet(TransportTag::Icmp, 2.0);
        excluded.protocol = 47;
        ctx.process(&excluded);

        let after = ctx.cache().iter().next().map(|(_, r)| r.clone()).unwrap();
        assert_eq!(before, after);
        assert_eq!(ctx.cache().len(), 1);
    }

    #[test]
    fn test_stats_follow_processing() {
        let mut ctx = FlowContext::new(FlowMode::Bidirectional);
        ctx.process(&packet(TransportTag::Udp, 1.0));
        ctx.process(&packet(TransportTag::Udp, 2.0));
        ctx.process(&packet(TransportTag::Icmp, 3.0));

        let (cache, stats) = ctx.finish();
        assert_eq!(cache.len(), 1);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.flows_created, 1);
        assert_eq!(stats.rejected.get("ICMP"), Some(&1));
        assert!(stats.end_time.is_some());
    }
}
