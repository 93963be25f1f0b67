//! Fill records produced when an order consumes rules.
//!
//! ## SSZ Serialization
//!
//! Fills are serialized with SSZ so a fulfilled order's breakdown has a
//! deterministic digest.

use ssz_rs::prelude::*;

/// The portion of one rule used to fill an order.
///
/// ## Terminology
///
/// - `sender_amount`: what the delegate gives from this rule
/// - `signer_amount`: what the taker owes for it (rounded up)
/// - `consumed`: the rule was unlinked by this fill
///
/// ## Example
///
/// ```
/// use delegate_book::types::Fill;
///
/// let fill = Fill::partial(3, 833, 161);
/// assert!(!fill.consumed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Fill {
    /// Rule the fill draws from
    pub rule_id: u64,

    /// Sender amount supplied by this rule
    pub sender_amount: u64,

    /// Signer amount owed for it
    pub signer_amount: u64,

    /// Whether the rule was fully consumed
    pub consumed: bool,
}

impl Fill {
    /// A fill that used up the whole rule
    pub fn full(rule_id: u64, sender_amount: u64, signer_amount: u64) -> Self {
        Self {
            rule_id,
            sender_amount,
            signer_amount,
            consumed: true,
        }
    }

    /// A fill that left the rule active
    pub fn partial(rule_id: u64, sender_amount: u64, signer_amount: u64) -> Self {
        Self {
            rule_id,
            sender_amount,
            signer_amount,
            consumed: false,
        }
    }
}
