//! Per-pair sorted rule list.
//!
//! ## Design
//!
//! A `PairIndex` is the head of a doubly linked list of rule IDs for one
//! token pair. The rule data lives in the [`RuleStore`]; this struct only
//! holds the list metadata.
//!
//! ## List Structure
//!
//! ```text
//! head (best rate, oldest) <-> rule <-> rule <-> tail (worst rate, newest)
//! ```
//!
//! - Rates are non-increasing from head to tail
//! - Equal rates keep creation order (earlier nearer head)
//! - `0` terminates the list in both directions

use std::cmp::Ordering;

use tracing::debug;

use crate::book::RuleStore;
use crate::error::{DelegateError, Result};
use crate::types::{Rule, RuleId, NO_RULE};

/// Head pointer and active count of one pair's rule list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairIndex {
    /// Best rule, or [`NO_RULE`] when empty
    pub head: RuleId,

    /// Number of rules reachable from `head`
    pub active_count: usize,
}

impl PairIndex {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == NO_RULE
    }

    /// Link a stored, detached rule at its rate-sorted position.
    ///
    /// Scans from the head past every rule whose rate is greater than or
    /// equal to the new rule's, so ties land behind earlier rules.
    ///
    /// # Errors
    ///
    /// `RuleNotActive` if `id` or a linked neighbour is missing from `store`.
    pub fn insert_sorted(&mut self, id: RuleId, store: &mut RuleStore) -> Result<()> {
        let new_rule = store.get(id).ok_or(DelegateError::RuleNotActive(id))?.clone();

        let mut prev = NO_RULE;
        let mut cursor = self.head;
        while cursor != NO_RULE {
            let existing = store.get(cursor).ok_or(DelegateError::RuleNotActive(cursor))?;
            if existing.cmp_rate(&new_rule) == Ordering::Less {
                break;
            }
            prev = cursor;
            cursor = existing.next;
        }

        self.link_between(id, prev, cursor, store)?;
        debug!(rule_id = id, prev, next = cursor, "linked rule");
        Ok(())
    }

    /// Splice `id` between `prev` and `next` (either may be [`NO_RULE`]).
    fn link_between(
        &mut self,
        id: RuleId,
        prev: RuleId,
        next: RuleId,
        store: &mut RuleStore,
    ) -> Result<()> {
        let node = store.get_mut(id).ok_or(DelegateError::RuleNotActive(id))?;
        node.prev = prev;
        node.next = next;

        if prev == NO_RULE {
            self.head = id;
        } else {
            let prev_node = store.get_mut(prev).ok_or(DelegateError::RuleNotActive(prev))?;
            prev_node.next = id;
        }

        if next != NO_RULE {
            let next_node = store.get_mut(next).ok_or(DelegateError::RuleNotActive(next))?;
            next_node.prev = id;
        }

        self.active_count += 1;
        Ok(())
    }

    /// Unlink a rule from the list, leaving it detached in the store.
    ///
    /// # Errors
    ///
    /// `RuleNotActive` if `id` is not in `store`.
    pub fn unlink(&mut self, id: RuleId, store: &mut RuleStore) -> Result<()> {
        let node = store.get(id).ok_or(DelegateError::RuleNotActive(id))?;
        let prev = node.prev;
        let next = node.next;

        if prev == NO_RULE {
            // This was the head
            self.head = next;
        } else if let Some(prev_node) = store.get_mut(prev) {
            prev_node.next = next;
        }

        if next != NO_RULE {
            if let Some(next_node) = store.get_mut(next) {
                next_node.prev = prev;
            }
        }

        if let Some(node) = store.get_mut(id) {
            node.prev = NO_RULE;
            node.next = NO_RULE;
        }

        self.active_count = self.active_count.saturating_sub(1);
        debug!(rule_id = id, prev, next, "unlinked rule");
        Ok(())
    }

    /// Walk the list from the head
    pub fn iter<'a>(&self, store: &'a RuleStore) -> PairIter<'a> {
        PairIter {
            store,
            cursor: self.head,
        }
    }

    /// Last rule in the list
    pub fn tail(&self, store: &RuleStore) -> RuleId {
        self.iter(store).last().map_or(NO_RULE, |rule| rule.id)
    }
}

/// Iterator over a pair's rules, best rate first.
#[derive(Debug, Clone)]
pub struct PairIter<'a> {
    store: &'a RuleStore,
    cursor: RuleId,
}

impl<'a> PairIter<'a> {
    /// An iterator that yields nothing
    pub fn empty(store: &'a RuleStore) -> Self {
        Self {
            store,
            cursor: NO_RULE,
        }
    }
}

impl<'a> Iterator for PairIter<'a> {
    type Item = &'a Rule;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NO_RULE {
            return None;
        }
        let rule = self.store.get(self.cursor)?;
        self.cursor = rule.next;
        Some(rule)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Address;

    fn add(store: &mut RuleStore, pair: &mut PairIndex, sender: u64, signer: u64) -> RuleId {
        let id = store.allocate_id();
        store.insert(Rule::new(
            id,
            Address::from_low_u64(1),
            Address::from_low_u64(2),
            sender,
            signer,
        ));
        pair.insert_sorted(id, store).unwrap();
        id
    }

    fn ids(pair: &PairIndex, store: &RuleStore) -> Vec<RuleId> {
        pair.iter(store).map(|r| r.id).collect()
    }

    #[test]
    fn test_pair_new() {
        let pair = PairIndex::new();
        assert!(pair.is_empty());
        assert_eq!(pair.head, NO_RULE);
        assert_eq!(pair.active_count, 0);
    }

    #[test]
    fn test_pair_insert_single() {
        let mut store = RuleStore::new();
        let mut pair = PairIndex::new();
        let id = add(&mut store, &mut pair, 100, 10);

        assert_eq!(pair.head, id);
        assert_eq!(pair.active_count, 1);
        assert_eq!(pair.tail(&store), id);
        assert!(store.get(id).unwrap().is_detached());
    }

    #[test]
    fn test_pair_insert_orders_by_rate() {
        let mut store = RuleStore::new();
        let mut pair = PairIndex::new();
        let low = add(&mut store, &mut pair, 100, 50); // 2.0
        let high = add(&mut store, &mut pair, 100, 10); // 10.0
        let mid = add(&mut store, &mut pair, 100, 20); // 5.0

        assert_eq!(ids(&pair, &store), vec![high, mid, low]);

        // Links: high <-> mid <-> low
        assert_eq!(store.get(high).unwrap().prev, NO_RULE);
        assert_eq!(store.get(high).unwrap().next, mid);
        assert_eq!(store.get(mid).unwrap().prev, high);
        assert_eq!(store.get(mid).unwrap().next, low);
        assert_eq!(store.get(low).unwrap().prev, mid);
        assert_eq!(store.get(low).unwrap().next, NO_RULE);
    }

    #[test]
    fn test_pair_equal_rates_are_fifo() {
        let mut store = RuleStore::new();
        let mut pair = PairIndex::new();
        let first = add(&mut store, &mut pair, 300, 50);
        let second = add(&mut store, &mut pair, 600, 100);
        let third = add(&mut store, &mut pair, 6, 1);

        assert_eq!(ids(&pair, &store), vec![first, second, third]);
    }

    #[test]
    fn test_pair_unlink_head_middle_tail() {
        let mut store = RuleStore::new();
        let mut pair = PairIndex::new();
        let a = add(&mut store, &mut pair, 100, 10);
        let b = add(&mut store, &mut pair, 100, 20);
        let c = add(&mut store, &mut pair, 100, 30);
        let d = add(&mut store, &mut pair, 100, 40);

        pair.unlink(b, &mut store).unwrap();
        assert_eq!(ids(&pair, &store), vec![a, c, d]);
        assert!(store.get(b).unwrap().is_detached());

        pair.unlink(a, &mut store).unwrap();
        assert_eq!(pair.head, c);
        assert_eq!(store.get(c).unwrap().prev, NO_RULE);

        pair.unlink(d, &mut store).unwrap();
        assert_eq!(store.get(c).unwrap().next, NO_RULE);
        assert_eq!(pair.active_count, 1);

        pair.unlink(c, &mut store).unwrap();
        assert!(pair.is_empty());
        assert_eq!(pair.active_count, 0);
    }

    #[test]
    fn test_pair_unlink_missing() {
        let mut store = RuleStore::new();
        let mut pair = PairIndex::new();
        assert!(matches!(
            pair.unlink(42, &mut store),
            Err(DelegateError::RuleNotActive(42))
        ));
    }
}
