use std::collections::{HashSet, VecDeque};

/// Upper bound on up-front allocation; larger caches grow as they fill
const MAX_PREALLOCATED: usize = 1024;

/// Bounded set of recently alerted signatures; the oldest entry is evicted first.
/// A capacity of 0 remembers nothing.
#[derive(Debug)]
pub struct RecentSignatures {
    capacity: usize,
    order: VecDeque<String>,
    members: HashSet<String>,
}

impl RecentSignatures {
    pub fn new(capacity: usize) -> Self {
        let preallocated = capacity.min(MAX_PREALLOCATED);
        Self {
            capacity,
            order: VecDeque::with_capacity(preallocated),
            members: HashSet::with_capacity(preallocated),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.members.contains(signature)
    }

    pub fn insert(&mut self, signature: &str) {
        if !self.is_enabled() || self.members.contains(signature) {
            return;
        }

        if self.order.len() == self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.members.remove(&evicted);
            }
        }

        self.order.push_back(signature.to_string());
        self.members.insert(signature.to_string());
    }
}
