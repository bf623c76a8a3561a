//! Upstream election strategies.

mod interleaved;
mod round_robin;
mod weighted;

pub use interleaved::InterleavedRoundRobin;
pub use round_robin::RoundRobin;
pub use weighted::WeightedRoundRobin;

use crate::balancer::Upstream;
use crate::config::Strategy as StrategyKind;
use std::sync::Arc;
use tracing::warn;

/// Stateful choice of the next upstream candidate.
///
/// Every call advances an internal cursor, available or not. `None` means
/// the current candidate is unavailable and the caller should try again;
/// the balancer wraps the calls in a deadline-bounded loop.
pub trait Strategy: Send + Sync + std::fmt::Debug {
    fn elect(&self, upstreams: &[Arc<Upstream>]) -> Option<Arc<Upstream>>;
}

/// Instantiate the strategy configured for a balancer.
pub fn for_kind(kind: &StrategyKind) -> Box<dyn Strategy> {
    match kind {
        StrategyKind::RoundRobin => Box::new(RoundRobin::new()),
        StrategyKind::WeightedRoundRobin => Box::new(WeightedRoundRobin::new()),
        StrategyKind::InterleavedRoundRobin => Box::new(InterleavedRoundRobin::new()),
        StrategyKind::IpHash => {
            warn!("strategy 'ip_hash' is reserved, falling back to round_robin");
            Box::new(RoundRobin::new())
        }
    }
}

/// Indices ordered by descending weight; insertion order breaks ties.
///
/// Both weighted strategies schedule over this ordering so that repeated
/// calls walk the pool in a stable sequence.
fn weight_order(upstreams: &[Arc<Upstream>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..upstreams.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(upstreams[i].weight()));
    order
}

/// Sum of all weights, the length of one scheduling cycle.
fn cycle_length(upstreams: &[Arc<Upstream>]) -> usize {
    upstreams.iter().map(|u| u.weight() as usize).sum()
}
