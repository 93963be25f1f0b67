//! The rule book: rule storage plus one sorted list per token pair.
//!
//! ## Architecture
//!
//! - **RuleStore**: arena of rules keyed by rule ID, plus the ID counter
//! - **PairIndex map**: `(sender_token, signer_token)` to list head and count
//!
//! The book is a plain value: the ID counter and every pair head are fields,
//! so independent books never share state.
//!
//! ## Example
//!
//! ```
//! use delegate_book::book::RuleBook;
//! use delegate_book::types::Address;
//!
//! let weth = Address::from_low_u64(1);
//! let dai = Address::from_low_u64(2);
//!
//! let mut book = RuleBook::new();
//! let worse = book.create_rule(weth, dai, 1000, 200).unwrap();
//! let better = book.create_rule(weth, dai, 300, 50).unwrap();
//!
//! let order: Vec<_> = book.iter_pair(weth, dai).map(|r| r.id).collect();
//! assert_eq!(order, vec![better, worse]);
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::book::{PairIndex, PairIter, RuleStore};
use crate::error::{DelegateError, Result};
use crate::types::{Address, PairKey, Rule, RuleId, NO_RULE};

/// Rule storage and per-pair sorted lists.
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    /// Every active rule
    pub(crate) store: RuleStore,

    /// Per-pair list heads, created lazily on a pair's first rule
    pub(crate) pairs: HashMap<PairKey, PairIndex>,
}

impl RuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a book with room for `rule_capacity` rules
    pub fn with_capacity(rule_capacity: usize) -> Self {
        Self {
            store: RuleStore::with_capacity(rule_capacity),
            pairs: HashMap::new(),
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Post a new rule and link it at its rate-sorted position.
    ///
    /// # Errors
    ///
    /// `AmountsZero` unless both amounts are strictly positive.
    pub fn create_rule(
        &mut self,
        sender_token: Address,
        signer_token: Address,
        sender_amount: u64,
        signer_amount: u64,
    ) -> Result<RuleId> {
        if sender_amount == 0 || signer_amount == 0 {
            return Err(DelegateError::AmountsZero);
        }

        let id = self.store.allocate_id();
        self.store.insert(Rule::new(
            id,
            sender_token,
            signer_token,
            sender_amount,
            signer_amount,
        ));

        let key = PairKey::new(sender_token, signer_token);
        let pair = self.pairs.entry(key).or_default();
        if let Err(err) = pair.insert_sorted(id, &mut self.store) {
            self.store.remove(id);
            return Err(err);
        }

        debug!(rule_id = id, sender_amount, signer_amount, "created rule");
        Ok(id)
    }

    /// Unlink and discard a rule.
    ///
    /// # Errors
    ///
    /// `RuleNotActive` if the rule does not exist or was already removed.
    pub fn delete_rule(&mut self, id: RuleId) -> Result<Rule> {
        let key = self
            .store
            .get(id)
            .map(Rule::pair)
            .ok_or(DelegateError::RuleNotActive(id))?;
        let pair = self
            .pairs
            .get_mut(&key)
            .ok_or(DelegateError::RuleNotActive(id))?;

        pair.unlink(id, &mut self.store)?;
        let removed = self
            .store
            .remove(id)
            .ok_or(DelegateError::RuleNotActive(id))?;

        debug!(rule_id = id, remaining = pair.active_count, "deleted rule");
        Ok(removed)
    }

    /// Take `sender_taken` from a rule that stays linked.
    ///
    /// The sender amount drops by exactly `sender_taken`; the signer amount
    /// becomes the creation rate applied to what is left, rounded up. The
    /// rate is untouched, so the rule keeps its list position.
    ///
    /// # Errors
    ///
    /// `PriceInvalid` unless `0 < sender_taken < sender_amount`.
    pub(crate) fn reduce_rule(&mut self, id: RuleId, sender_taken: u64) -> Result<()> {
        let rule = self
            .store
            .get_mut(id)
            .ok_or(DelegateError::RuleNotActive(id))?;
        if sender_taken == 0 || sender_taken >= rule.sender_amount {
            return Err(DelegateError::PriceInvalid);
        }
        rule.sender_amount -= sender_taken;
        rule.signer_amount = rule.signer_for(rule.sender_amount);
        debug!(
            rule_id = id,
            sender_amount = rule.sender_amount,
            signer_amount = rule.signer_amount,
            "reduced rule"
        );
        Ok(())
    }

    // ========================================================================
    // Read Access
    // ========================================================================

    #[inline]
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.store.get(id)
    }

    /// The list head and count for a pair, if the pair ever had a rule
    pub fn pair(&self, sender_token: Address, signer_token: Address) -> Option<&PairIndex> {
        self.pairs.get(&PairKey::new(sender_token, signer_token))
    }

    /// Rules of a pair, best rate first
    pub fn iter_pair(&self, sender_token: Address, signer_token: Address) -> PairIter<'_> {
        match self.pair(sender_token, signer_token) {
            Some(pair) => pair.iter(&self.store),
            None => PairIter::empty(&self.store),
        }
    }

    /// Number of active rules for a pair
    pub fn active_count(&self, sender_token: Address, signer_token: Address) -> usize {
        self.pair(sender_token, signer_token)
            .map_or(0, |pair| pair.active_count)
    }

    /// True if the pair has at least one active rule
    pub fn is_pair_active(&self, sender_token: Address, signer_token: Address) -> bool {
        self.pair(sender_token, signer_token)
            .is_some_and(|pair| !pair.is_empty())
    }

    /// Total `(sender, signer)` amounts posted on a pair, saturating
    pub fn capacity(&self, sender_token: Address, signer_token: Address) -> (u64, u64) {
        self.iter_pair(sender_token, signer_token)
            .fold((0u64, 0u64), |(sender, signer), rule| {
                (
                    sender.saturating_add(rule.sender_amount),
                    signer.saturating_add(rule.signer_amount),
                )
            })
    }

    /// Total number of active rules across all pairs
    #[inline]
    pub fn rule_count(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Pairs that currently have rules, in key order
    pub fn active_pairs(&self) -> Vec<PairKey> {
        let mut keys: Vec<PairKey> = self
            .pairs
            .iter()
            .filter(|(_, pair)| !pair.is_empty())
            .map(|(key, _)| *key)
            .collect();
        keys.sort();
        keys
    }

    /// Next rule ID that will be allocated
    #[inline]
    pub fn peek_next_rule_id(&self) -> RuleId {
        self.store.peek_next_id()
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Verify every list and the store agree.
    ///
    /// Checks, per pair: forward traversal terminates, back links mirror
    /// forward links, rates are non-increasing with FIFO ties, every node
    /// belongs to the pair, and `active_count` matches. Also checks that every
    /// stored rule is reachable from exactly one list and has positive amounts.
    ///
    /// # Errors
    ///
    /// `CorruptSnapshot` describing the first violation found.
    pub fn check_invariants(&self) -> Result<()> {
        let corrupt = |msg: String| Err(DelegateError::CorruptSnapshot(msg));
        let mut reachable = 0usize;

        for (key, pair) in &self.pairs {
            let mut prev: Option<&Rule> = None;
            let mut cursor = pair.head;
            let mut count = 0usize;

            while cursor != NO_RULE {
                let Some(rule) = self.store.get(cursor) else {
                    return corrupt(format!("dangling link to rule {cursor}"));
                };
                count += 1;
                if count > self.store.len() {
                    return corrupt("cycle in rule list".to_string());
                }
                if rule.pair() != *key {
                    return corrupt(format!("rule {} linked under the wrong pair", rule.id));
                }
                if rule.sender_amount == 0 || rule.signer_amount == 0 {
                    return corrupt(format!("rule {} has a zero amount", rule.id));
                }
                if rule.sender_amount > rule.original_sender_amount
                    || rule.signer_amount != rule.signer_for(rule.sender_amount)
                {
                    return corrupt(format!("rule {} amounts drifted from its rate", rule.id));
                }
                let expected_prev = prev.map_or(NO_RULE, |p| p.id);
                if rule.prev != expected_prev {
                    return corrupt(format!(
                        "rule {} prev is {} but {} precedes it",
                        rule.id, rule.prev, expected_prev
                    ));
                }
                if let Some(p) = prev {
                    match p.cmp_rate(rule) {
                        Ordering::Less => {
                            return corrupt(format!("rule {} outranks rule {}", rule.id, p.id))
                        }
                        Ordering::Equal if p.id > rule.id => {
                            return corrupt(format!("tie between {} and {} out of order", p.id, rule.id))
                        }
                        _ => {}
                    }
                }
                prev = Some(rule);
                cursor = rule.next;
            }

            if count != pair.active_count {
                return corrupt(format!(
                    "pair count {} but {} rules reachable",
                    pair.active_count, count
                ));
            }
            reachable += count;
        }

        if reachable != self.store.len() {
            return corrupt(format!(
                "{} rules stored but {} reachable",
                self.store.len(),
                reachable
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
