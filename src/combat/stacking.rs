//! Active damage-over-time applications, oldest first.

use std::collections::VecDeque;

/// Bounded FIFO of stack expiry timestamps (ms). Insertion order is application order;
/// eviction always drops the oldest application regardless of its expiry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpiringStacks {
    expiries: VecDeque<u64>,
    max_stack: usize,
}

impl ExpiringStacks {
    pub fn new(max_stack: usize) -> Self {
        Self {
            expiries: VecDeque::with_capacity(max_stack),
            max_stack,
        }
    }

    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    /// Reset for another trial, optionally with a different cap. Keeps the allocation.
    pub fn reset(&mut self, max_stack: usize) {
        self.expiries.clear();
        if max_stack > self.expiries.capacity() {
            self.expiries.reserve(max_stack);
        }
        self.max_stack = max_stack;
    }

    pub fn clear(&mut self) {
        self.expiries.clear();
    }

    /// Drop every entry with expiry <= `now`.
    pub fn prune(&mut self, now: u64) {
        self.expiries.retain(|&expiry| expiry > now);
    }

    /// Apply a new stack. At capacity, the oldest application is evicted first.
    pub fn push(&mut self, expiry: u64) {
        if self.max_stack == 0 {
            return;
        }
        if self.expiries.len() >= self.max_stack {
            self.expiries.pop_front();
        }
        self.expiries.push_back(expiry);
    }

    pub fn count(&self) -> usize {
        self.expiries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.expiries.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(stacks: &ExpiringStacks) -> Vec<u64> {
        stacks.iter().collect()
    }

    #[test]
    fn third_push_evicts_first_at_cap_two() {
        let mut stacks = ExpiringStacks::new(2);
        stacks.push(5000);
        stacks.push(6000);
        stacks.push(7000);
        assert_eq!(entries(&stacks), vec![6000, 7000]);
    }

    #[test]
    fn eviction_ignores_expiry_order() {
        let mut stacks = ExpiringStacks::new(2);
        stacks.push(9000);
        stacks.push(1000);
        stacks.push(5000);
        // the long-lived first application goes, not the soonest to expire
        assert_eq!(entries(&stacks), vec![1000, 5000]);
    }

    #[test]
    fn prune_removes_expired_and_keeps_order() {
        let mut stacks = ExpiringStacks::new(4);
        stacks.push(3000);
        stacks.push(1000);
        stacks.push(4000);
        stacks.push(2000);
        stacks.prune(2000);
        assert_eq!(entries(&stacks), vec![3000, 4000]);
    }

    #[test]
    fn prune_boundary_is_inclusive() {
        let mut stacks = ExpiringStacks::new(1);
        stacks.push(1000);
        stacks.prune(999);
        assert_eq!(stacks.count(), 1);
        stacks.prune(1000);
        assert!(stacks.is_empty());
    }

    #[test]
    fn prune_is_idempotent() {
        let mut stacks = ExpiringStacks::new(3);
        stacks.push(1500);
        stacks.push(2500);
        stacks.push(3500);
        stacks.prune(2500);
        let once = stacks.clone();
        stacks.prune(2500);
        assert_eq!(stacks, once);
    }

    #[test]
    fn count_never_exceeds_cap_under_mixed_ops() {
        let mut stacks = ExpiringStacks::new(3);
        for t in 0..200u64 {
            if t % 7 == 0 {
                stacks.prune(t * 10);
            }
            stacks.push(t * 10 + 35);
            assert!(stacks.count() <= 3);
        }
    }

    #[test]
    fn reset_changes_cap_and_empties() {
        let mut stacks = ExpiringStacks::new(1);
        stacks.push(10);
        stacks.reset(5);
        assert!(stacks.is_empty());
        assert_eq!(stacks.max_stack(), 5);
        for e in 0..6 {
            stacks.push(e);
        }
        assert_eq!(entries(&stacks), vec![1, 2, 3, 4, 5]);
    }
}
