//! Durable snapshots of the rule book.
//!
//! ## Format
//!
//! A snapshot is the SSZ encoding of [`BookSnapshot`]: the rule ID counter
//! followed by every active rule (links included) in ascending ID order.
//! The encoding is deterministic, so its SHA-256 is a state root: two books
//! with the same root hold byte-identical rules.
//!
//! ## Loading
//!
//! Pair heads and counts are rebuilt from the rules' links and the whole book
//! is checked with [`RuleBook::check_invariants`] before it is returned.
//!
//! ## Example
//!
//! ```
//! use delegate_book::book::RuleBook;
//! use delegate_book::types::Address;
//!
//! let mut book = RuleBook::new();
//! book.create_rule(Address::from_low_u64(1), Address::from_low_u64(2), 300, 50).unwrap();
//!
//! let bytes = book.encode().unwrap();
//! let restored = RuleBook::decode(&bytes).unwrap();
//! assert_eq!(restored.state_root().unwrap(), book.state_root().unwrap());
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;
use tracing::{debug, info};

use crate::book::{PairIndex, RuleBook};
// SSZ derive output names the prelude `Result`
use crate::error::{self, DelegateError};
use crate::types::{Rule, NO_RULE};

/// Upper bound on rules in one snapshot
pub const MAX_RULES: usize = 1 << 20;

/// Serializable image of a [`RuleBook`].
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct BookSnapshot {
    /// Next rule ID the book will allocate
    pub next_rule_id: u64,

    /// Active rules in ascending ID order
    pub rules: List<Rule, MAX_RULES>,
}

impl RuleBook {
    /// Capture the book
    pub fn snapshot(&self) -> error::Result<BookSnapshot> {
        let rules: Vec<Rule> = self.store.rules_by_id().into_iter().cloned().collect();
        let count = rules.len();
        let rules = List::<Rule, MAX_RULES>::try_from(rules).map_err(|_| {
            DelegateError::Encoding(format!("{count} rules exceed snapshot limit {MAX_RULES}"))
        })?;
        Ok(BookSnapshot {
            next_rule_id: self.store.peek_next_id(),
            rules,
        })
    }

    /// Rebuild a book from a snapshot.
    ///
    /// # Errors
    ///
    /// `CorruptSnapshot` if IDs are duplicated or out of range, a pair has
    /// more than one head, or any list invariant fails.
    pub fn from_snapshot(snapshot: &BookSnapshot) -> error::Result<Self> {
        let corrupt = |msg: String| DelegateError::CorruptSnapshot(msg);
        let mut book = RuleBook::with_capacity(snapshot.rules.len());
        let mut seen = HashSet::with_capacity(snapshot.rules.len());

        for rule in snapshot.rules.iter() {
            if rule.id == NO_RULE || rule.id >= snapshot.next_rule_id {
                return Err(corrupt(format!(
                    "rule id {} outside 1..{}",
                    rule.id, snapshot.next_rule_id
                )));
            }
            if !seen.insert(rule.id) {
                return Err(corrupt(format!("duplicate rule id {}", rule.id)));
            }

            let pair = book.pairs.entry(rule.pair()).or_insert_with(PairIndex::new);
            pair.active_count += 1;
            if rule.prev == NO_RULE {
                if pair.head != NO_RULE {
                    return Err(corrupt(format!(
                        "rules {} and {} both claim the head",
                        pair.head, rule.id
                    )));
                }
                pair.head = rule.id;
            }
            book.store.insert(rule.clone());
        }

        book.store.restore_next_id(snapshot.next_rule_id);
        book.check_invariants()?;
        Ok(book)
    }

    /// SSZ-encode the book
    pub fn encode(&self) -> error::Result<Vec<u8>> {
        let snapshot = self.snapshot()?;
        ssz_rs::serialize(&snapshot).map_err(|e| DelegateError::Encoding(format!("{e:?}")))
    }

    /// Decode and verify an encoded book
    pub fn decode(bytes: &[u8]) -> error::Result<Self> {
        let snapshot: BookSnapshot = ssz_rs::deserialize(bytes)
            .map_err(|e| DelegateError::CorruptSnapshot(format!("{e:?}")))?;
        Self::from_snapshot(&snapshot)
    }

    /// SHA-256 of the encoded book
    pub fn state_root(&self) -> error::Result<[u8; 32]> {
        let bytes = self.encode()?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let result = hasher.finalize();

        let mut root = [0u8; 32];
        root.copy_from_slice(&result);
        Ok(root)
    }

    /// State root as a hex string
    pub fn state_root_hex(&self) -> error::Result<String> {
        Ok(hex::encode(self.state_root()?))
    }

    /// Write the book to `path`, replacing it atomically via a temp file
    pub fn save(&self, path: &Path) -> error::Result<()> {
        let bytes = self.encode()?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), bytes = bytes.len(), rules = self.rule_count(), "saved rule book");
        Ok(())
    }

    /// Read a book written by [`RuleBook::save`]
    pub fn load(path: &Path) -> error::Result<Self> {
        let bytes = fs::read(path)?;
        let book = Self::decode(&bytes)?;
        info!(path = %path.display(), rules = book.rule_count(), "loaded rule book");
        Ok(book)
    }

    /// Load `path`, or start empty if it does not exist yet
    pub fn load_or_new(path: &Path) -> error::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            info!(path = %path.display(), "no saved rule book; starting empty");
            Ok(Self::new())
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
