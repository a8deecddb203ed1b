//! Weighted draw-without-replacement pool of host ids.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    host: usize,
    remaining: usize,
}

/// Each host starts with a fixed number of draws; a host leaves the pool
/// once its draws are used up. Every remaining host is equally likely to be
/// drawn regardless of how many draws it has left.
#[derive(Debug, Clone)]
pub struct NodePool {
    slots: Vec<Slot>,
    rng: StdRng,
}

impl NodePool {
    /// Pool of hosts `0..hosts`, each drawable `weight` times.
    ///
    /// Slots are laid out highest host first.
    pub fn new(hosts: usize, weight: usize, seed: u64) -> Self {
        let slots = if weight == 0 {
            Vec::new()
        } else {
            (0..hosts)
                .rev()
                .map(|host| Slot { host, remaining: weight })
                .collect()
        };
        NodePool {
            slots,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw a host uniformly among those with draws left.
    pub fn pop(&mut self) -> Option<usize> {
        if self.slots.is_empty() {
            return None;
        }
        let at = self.rng.gen_range(0..self.slots.len());
        let slot = &mut self.slots[at];
        let host = slot.host;
        slot.remaining -= 1;
        if slot.remaining == 0 {
            self.slots.swap_remove(at);
        }
        Some(host)
    }

    /// Number of distinct hosts still drawable
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total draws left across all hosts
    pub fn remaining(&self) -> usize {
        self.slots.iter().map(|s| s.remaining).sum()
    }
}
