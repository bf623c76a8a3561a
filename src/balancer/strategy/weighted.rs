//! Weighted round-robin election strategy.

use super::{cycle_length, weight_order, Strategy};
use crate::balancer::Upstream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Emits each upstream for a run of `weight` consecutive picks.
///
/// The schedule walks the pool in descending-weight order, so one cycle over
/// weights `(5,2,3)` emits indices `0,0,0,0,0,2,2,2,1,1` and repeats.
#[derive(Debug)]
pub struct WeightedRoundRobin {
    cursor: AtomicUsize,
}

impl WeightedRoundRobin {
    pub fn new() -> Self {
        Self {
            cursor: AtomicUsize::new(0),
        }
    }
}

impl Default for WeightedRoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for WeightedRoundRobin {
    fn elect(&self, upstreams: &[Arc<Upstream>]) -> Option<Arc<Upstream>> {
        let cycle = cycle_length(upstreams);
        if cycle == 0 {
            return None;
        }

        let mut position = self.cursor.fetch_add(1, Ordering::Relaxed) % cycle;

        for idx in weight_order(upstreams) {
            let weight = upstreams[idx].weight() as usize;
            if position < weight {
                let candidate = &upstreams[idx];
                return candidate.is_available().then(|| Arc::clone(candidate));
            }
            position -= weight;
        }

        None
    }
}
