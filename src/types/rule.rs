//! Rule records for the delegate rule book.
//!
//! ## SSZ Serialization
//!
//! `Rule` derives `SimpleSerialize` from ssz_rs so the persisted book has a
//! deterministic byte encoding:
//! - Basic types (u64): little-endian
//! - Token identifiers: fixed 20-byte vectors
//!
//! ## Rate
//!
//! A rule's rate is the ratio of the amounts it was created with, kept in
//! `original_sender_amount` / `original_signer_amount`. Partial fills take
//! exactly the sender amount traded; the remaining signer amount is then
//! recomputed from the creation ratio, rounded up.
//!
//! ## Links
//!
//! `prev` and `next` are rule IDs, not references. `0` ([`NO_RULE`]) is the
//! sentinel at both ends of a pair's list.

use std::cmp::Ordering;

use ssz_rs::prelude::*;

use crate::types::address::{Address, ADDRESS_LEN};
use crate::types::rate;

/// Rule identifier. Nonzero, monotonic, never reused.
pub type RuleId = u64;

/// Sentinel link value meaning "no rule"
pub const NO_RULE: RuleId = 0;

// ============================================================================
// PairKey
// ============================================================================

/// The token pair a rule trades: the delegate gives `sender_token` and
/// receives `signer_token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub sender_token: Address,
    pub signer_token: Address,
}

impl PairKey {
    pub fn new(sender_token: Address, signer_token: Address) -> Self {
        Self {
            sender_token,
            signer_token,
        }
    }
}

// ============================================================================
// Rule
// ============================================================================

/// A standing, partially fillable offer of up to `sender_amount` of the
/// sender token for `signer_amount` of the signer token.
///
/// ## Example
///
/// ```
/// use delegate_book::types::{Address, Rule};
///
/// let rule = Rule::new(1, Address::from_low_u64(1), Address::from_low_u64(2), 1664, 320);
/// assert_eq!(rule.signer_for(833), 161);
/// assert_eq!(rule.sender_for(100), 520);
/// assert!(rule.is_detached());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Rule {
    /// Rule identifier
    pub id: u64,

    /// Token the delegate gives
    pub sender_token: [u8; ADDRESS_LEN],

    /// Token the delegate receives
    pub signer_token: [u8; ADDRESS_LEN],

    /// Remaining amount the delegate will give
    pub sender_amount: u64,

    /// Remaining amount the delegate requires in return
    pub signer_amount: u64,

    /// Sender amount at creation; with `original_signer_amount`, the rate
    pub original_sender_amount: u64,

    /// Signer amount at creation
    pub original_signer_amount: u64,

    /// Previous (better or equal, older) rule in the pair list
    pub prev: u64,

    /// Next (worse or equal, newer) rule in the pair list
    pub next: u64,
}

impl Rule {
    /// Create an unlinked rule
    pub fn new(
        id: RuleId,
        sender_token: Address,
        signer_token: Address,
        sender_amount: u64,
        signer_amount: u64,
    ) -> Self {
        Self {
            id,
            sender_token: sender_token.0,
            signer_token: signer_token.0,
            sender_amount,
            signer_amount,
            original_sender_amount: sender_amount,
            original_signer_amount: signer_amount,
            prev: NO_RULE,
            next: NO_RULE,
        }
    }

    #[inline]
    pub fn sender_token(&self) -> Address {
        Address(self.sender_token)
    }

    #[inline]
    pub fn signer_token(&self) -> Address {
        Address(self.signer_token)
    }

    #[inline]
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.sender_token(), self.signer_token())
    }

    /// True if the rule has no neighbours
    #[inline]
    pub fn is_detached(&self) -> bool {
        self.prev == NO_RULE && self.next == NO_RULE
    }

    /// Compare this rule's rate against another's.
    ///
    /// `Greater` means this rule gives more sender token per signer token.
    /// Only creation amounts take part, so fills never move a rule.
    #[inline]
    pub fn cmp_rate(&self, other: &Rule) -> Ordering {
        rate::compare_rates(
            self.original_sender_amount,
            self.original_signer_amount,
            other.original_sender_amount,
            other.original_signer_amount,
        )
    }

    /// Signer amount owed for `sender_amount` at this rule's rate, rounded up.
    ///
    /// `sender_amount` must not exceed the remaining sender amount.
    #[inline]
    pub fn signer_for(&self, sender_amount: u64) -> u64 {
        rate::mul_div_ceil(
            self.original_signer_amount,
            sender_amount,
            self.original_sender_amount,
        )
    }

    /// Sender amount given for `signer_amount` at this rule's rate, rounded down.
    ///
    /// `signer_amount` must be below the remaining signer amount.
    #[inline]
    pub fn sender_for(&self, signer_amount: u64) -> u64 {
        rate::mul_div_floor(
            self.original_sender_amount,
            signer_amount,
            self.original_signer_amount,
        )
    }
}
