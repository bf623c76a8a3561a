//! Interleaved weighted round-robin election strategy.

use super::{cycle_length, weight_order, Strategy};
use crate::balancer::Upstream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Spreads weighted picks across the cycle instead of emitting them in runs.
///
/// The schedule is built round by round: each round emits every upstream
/// that still has quota left in the current cycle, in descending-weight
/// order. No upstream is picked twice in a row while another still has
/// quota. One cycle over weights `(5,2,3)` emits `0,2,1,0,2,1,0,2,0,0`.
#[derive(Debug)]
pub struct InterleavedRoundRobin {
    cursor: AtomicUsize,
}

impl InterleavedRoundRobin {
    pub fn new() -> Self {
        Self {
            cursor: AtomicUsize::new(0),
        }
    }
}

impl Default for InterleavedRoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for InterleavedRoundRobin {
    fn elect(&self, upstreams: &[Arc<Upstream>]) -> Option<Arc<Upstream>> {
        let cycle = cycle_length(upstreams);
        if cycle == 0 {
            return None;
        }

        let mut position = self.cursor.fetch_add(1, Ordering::Relaxed) % cycle;

        let order = weight_order(upstreams);
        let mut remaining: Vec<usize> = upstreams.iter().map(|u| u.weight() as usize).collect();

        // position < cycle = sum(remaining), so a round always makes progress.
        loop {
            for &idx in &order {
                if remaining[idx] == 0 {
                    continue;
                }

                if position == 0 {
                    let candidate = &upstreams[idx];
                    return candidate.is_available().then(|| Arc::clone(candidate));
                }

                remaining[idx] -= 1;
                position -= 1;
            }
        }
    }
}
