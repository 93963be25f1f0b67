//! Read-only quoting over the rule book.
//!
//! ## Quoting Rules
//!
//! Every quote walks a pair's list from the best rule, filling the request
//! one rule at a time:
//!
//! - **Signer side**: how much the taker must pay for a sender amount.
//!   The partial rule is charged `ceil`, and a request beyond capacity
//!   quotes `0`.
//! - **Sender side**: how much the delegate gives for a signer amount.
//!   The partial rule pays `floor`, and a request at or beyond capacity
//!   saturates at the total sender capacity.
//! - **Max**: the largest sender amount the trade wallet can actually back.
//! - **Levels**: one entry per rule, best first.
//!
//! Quotes never fail on thin liquidity.
//!
//! ## Example
//!
//! ```
//! use delegate_book::book::RuleBook;
//! use delegate_book::quote::QuoteEngine;
//! use delegate_book::types::Address;
//!
//! let weth = Address::from_low_u64(1);
//! let dai = Address::from_low_u64(2);
//!
//! let mut book = RuleBook::new();
//! book.create_rule(weth, dai, 300, 50).unwrap();
//! book.create_rule(weth, dai, 1000, 200).unwrap();
//!
//! let quotes = QuoteEngine::new(&book);
//! assert_eq!(quotes.signer_side_quote(300, weth, dai), 50);
//! assert_eq!(quotes.signer_side_quote(350, weth, dai), 60);
//! assert_eq!(quotes.signer_side_quote(1301, weth, dai), 0);
//! ```

use rust_decimal::Decimal;

use crate::book::RuleBook;
use crate::settlement::TokenView;
use crate::types::{rate, Address, RuleId};

/// One rule in a depth-of-book snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub rule_id: RuleId,
    pub sender_amount: u64,
    pub signer_amount: u64,
}

impl Level {
    /// Signer tokens per sender token
    pub fn price(&self) -> Option<Decimal> {
        rate::price(self.sender_amount, self.signer_amount)
    }
}

/// Quotes computed against a borrowed book. Never mutates it.
#[derive(Debug, Clone, Copy)]
pub struct QuoteEngine<'a> {
    book: &'a RuleBook,
}

impl<'a> QuoteEngine<'a> {
    pub fn new(book: &'a RuleBook) -> Self {
        Self { book }
    }

    /// Signer amount needed to receive `sender_amount` of `sender_token`.
    ///
    /// Returns `0` for an empty pair, a zero request, or a request above the
    /// pair's total capacity.
    pub fn signer_side_quote(
        &self,
        sender_amount: u64,
        sender_token: Address,
        signer_token: Address,
    ) -> u64 {
        if sender_amount == 0 {
            return 0;
        }

        let mut remaining = sender_amount;
        let mut signer_total: u64 = 0;

        for rule in self.book.iter_pair(sender_token, signer_token) {
            if rule.sender_amount <= remaining {
                signer_total = signer_total.saturating_add(rule.signer_amount);
                remaining -= rule.sender_amount;
            } else {
                let part = rule.signer_for(remaining);
                signer_total = signer_total.saturating_add(part);
                remaining = 0;
            }
            if remaining == 0 {
                return signer_total;
            }
        }

        // Not enough posted capacity
        0
    }

    /// Sender amount given for `signer_amount` of `signer_token`.
    ///
    /// Saturates at the pair's total sender capacity once the request reaches
    /// its total signer capacity. Returns `0` for an empty pair.
    pub fn sender_side_quote(
        &self,
        signer_amount: u64,
        signer_token: Address,
        sender_token: Address,
    ) -> u64 {
        let mut remaining = signer_amount;
        let mut sender_total: u64 = 0;

        for rule in self.book.iter_pair(sender_token, signer_token) {
            if remaining == 0 {
                break;
            }
            if rule.signer_amount <= remaining {
                sender_total = sender_total.saturating_add(rule.sender_amount);
                remaining -= rule.signer_amount;
            } else {
                let part = rule.sender_for(remaining);
                sender_total = sender_total.saturating_add(part);
                remaining = 0;
            }
        }

        sender_total
    }

    /// Largest `(sender, signer)` quote the trade wallet can back.
    ///
    /// The sender bound is the smallest of the pair's capacity, the trade
    /// wallet's `sender_token` balance, and its allowance to `spender`.
    pub fn max_quote(
        &self,
        sender_token: Address,
        signer_token: Address,
        trade_wallet: Address,
        spender: Address,
        tokens: &impl TokenView,
    ) -> (u64, u64) {
        let (capacity, _) = self.book.capacity(sender_token, signer_token);
        if capacity == 0 {
            return (0, 0);
        }

        let balance = tokens.balance_of(trade_wallet, sender_token);
        let allowance = tokens.allowance(trade_wallet, spender, sender_token);
        let bound = capacity.min(balance).min(allowance);

        (bound, self.signer_side_quote(bound, sender_token, signer_token))
    }

    /// Every rule of the pair, best rate first
    pub fn levels(&self, sender_token: Address, signer_token: Address) -> Vec<Level> {
        self.book
            .iter_pair(sender_token, signer_token)
            .map(|rule| Level {
                rule_id: rule.id,
                sender_amount: rule.sender_amount,
                signer_amount: rule.signer_amount,
            })
            .collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
