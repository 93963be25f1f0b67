//! Rule storage keyed by rule ID.
//!
//! ## Memory Model
//!
//! Rules live in a `Slab` arena. Slab keys may be reused after removal, so
//! they never leave this module: callers address rules by [`RuleId`], which
//! is allocated from a monotonic counter and never reused.
//!
//! Per slab docs (https://docs.rs/slab/0.4.11):
//! - `Slab::with_capacity(n)` pre-allocates n slots
//! - O(1) insert, remove, and lookup

use std::collections::HashMap;

use slab::Slab;

use crate::types::{Rule, RuleId, NO_RULE};

/// Keyed collection of rules plus the rule ID counter.
#[derive(Debug, Clone)]
pub struct RuleStore {
    /// Rule arena
    /// Key: slab index, Value: Rule
    rules: Slab<Rule>,

    /// Rule ID to slab key mapping
    index: HashMap<RuleId, usize>,

    /// Next rule ID to hand out
    next_rule_id: RuleId,
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleStore {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rules: Slab::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            next_rule_id: 1,
        }
    }

    // ========================================================================
    // ID Generation
    // ========================================================================

    /// Take the next rule ID
    #[inline]
    pub fn allocate_id(&mut self) -> RuleId {
        let id = self.next_rule_id;
        self.next_rule_id += 1;
        id
    }

    /// Get the next rule ID without consuming it
    #[inline]
    pub fn peek_next_id(&self) -> RuleId {
        self.next_rule_id
    }

    /// Restore the counter from a snapshot. Never moves it backwards.
    pub(crate) fn restore_next_id(&mut self, next_rule_id: RuleId) {
        self.next_rule_id = self.next_rule_id.max(next_rule_id);
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Store a rule under its ID, replacing any rule with the same ID
    pub fn insert(&mut self, rule: Rule) {
        debug_assert_ne!(rule.id, NO_RULE);
        if let Some(&key) = self.index.get(&rule.id) {
            self.rules[key] = rule;
            return;
        }
        let id = rule.id;
        let key = self.rules.insert(rule);
        self.index.insert(id, key);
    }

    /// Remove a rule and return it
    pub fn remove(&mut self, id: RuleId) -> Option<Rule> {
        let key = self.index.remove(&id)?;
        Some(self.rules.remove(key))
    }

    #[inline]
    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        let key = *self.index.get(&id)?;
        self.rules.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, id: RuleId) -> Option<&mut Rule> {
        let key = *self.index.get(&id)?;
        self.rules.get_mut(key)
    }

    #[inline]
    pub fn contains(&self, id: RuleId) -> bool {
        self.index.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All stored rules in ascending ID order
    pub fn rules_by_id(&self) -> Vec<&Rule> {
        let mut rules: Vec<&Rule> = self.rules.iter().map(|(_, rule)| rule).collect();
        rules.sort_unstable_by_key(|rule| rule.id);
        rules
    }
}
