//! Order fulfillment against the rule book.
//!
//! ## Two-Phase Fill
//!
//! 1. **Plan**: walk the pair's list and compute every fill, every rule to
//!    unlink, and the one rule to reduce, without touching the book.
//! 2. **Settle**: hand the order to the settlement engine.
//! 3. **Commit**: only if settlement succeeded, apply the plan.
//!
//! A rejected order or a failed settlement leaves the book exactly as it was.
//!
//! ## Partial Fills
//!
//! The taker pays `ceil(r * signer / sender)` at the rule's creation rate for
//! `r` sender units of a partly used rule. The rule gives up exactly `r`; what
//! it still asks for is recomputed from the creation rate, rounded up, so the
//! delegate is never paid less than its rate for anything it hands over.

use tracing::{debug, info, warn};

use crate::book::RuleBook;
use crate::error::{DelegateError, Result};
use crate::settlement::SettlementEngine;
use crate::types::{Address, Fill, Order, PairKey, RuleId, SettlementReceipt};

/// Everything an order will do to the book, computed up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillPlan {
    /// Pair the order trades
    pub pair: PairKey,

    /// Sender amount the order takes
    pub sender_amount: u64,

    /// Minimum signer amount the rules demand
    pub required_signer_amount: u64,

    /// Per-rule breakdown, best rule first
    pub fills: Vec<Fill>,

    /// Rules unlinked on commit
    pub consumed: Vec<RuleId>,

    /// `(rule, sender amount taken)` for the last rule, if it survives the
    /// fill
    pub reduction: Option<(RuleId, u64)>,
}

/// Result of a settled order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fulfillment {
    pub receipt: SettlementReceipt,
    pub fills: Vec<Fill>,
    pub required_signer_amount: u64,
}

/// Consumes rules to fill orders for one trade wallet.
#[derive(Debug, Clone)]
pub struct OrderFulfillment {
    trade_wallet: Address,
}

impl OrderFulfillment {
    pub fn new(trade_wallet: Address) -> Self {
        Self { trade_wallet }
    }

    #[inline]
    pub fn trade_wallet(&self) -> Address {
        self.trade_wallet
    }

    /// Validate `order` and compute its fill plan without mutating `book`.
    ///
    /// # Errors
    ///
    /// - `SenderWalletInvalid` if the sender wallet is set and is not the
    ///   trade wallet
    /// - `SignerKindNotFungible` / `SenderKindNotFungible`
    /// - `TokenPairInactive` if the pair has no rules
    /// - `AmountsZero` if the order takes nothing
    /// - `PriceInvalid` if capacity is short or the signer underpays
    pub fn plan(&self, book: &RuleBook, order: &Order) -> Result<FillPlan> {
        if let Some(wallet) = order.sender.wallet {
            if wallet != self.trade_wallet {
                return Err(DelegateError::SenderWalletInvalid);
            }
        }
        if !order.signer.kind.is_fungible() {
            return Err(DelegateError::SignerKindNotFungible);
        }
        if !order.sender.kind.is_fungible() {
            return Err(DelegateError::SenderKindNotFungible);
        }

        let pair = order.pair();
        if !book.is_pair_active(pair.sender_token, pair.signer_token) {
            return Err(DelegateError::TokenPairInactive);
        }
        if order.sender.amount == 0 {
            return Err(DelegateError::AmountsZero);
        }

        let mut remaining = order.sender.amount;
        let mut required: u64 = 0;
        let mut fills = Vec::new();
        let mut consumed = Vec::new();
        let mut reduction = None;

        for rule in book.iter_pair(pair.sender_token, pair.signer_token) {
            if rule.sender_amount <= remaining {
                required = required.saturating_add(rule.signer_amount);
                remaining -= rule.sender_amount;
                fills.push(Fill::full(rule.id, rule.sender_amount, rule.signer_amount));
                consumed.push(rule.id);
            } else {
                let charge = rule.signer_for(remaining);
                required = required.saturating_add(charge);
                fills.push(Fill::partial(rule.id, remaining, charge));
                reduction = Some((rule.id, remaining));
                remaining = 0;
            }

            if remaining == 0 {
                break;
            }
        }

        if remaining > 0 {
            debug!(short_by = remaining, "order exceeds posted capacity");
            return Err(DelegateError::PriceInvalid);
        }
        if order.signer.amount < required {
            debug!(
                offered = order.signer.amount,
                required, "order underpays posted rules"
            );
            return Err(DelegateError::PriceInvalid);
        }

        Ok(FillPlan {
            pair,
            sender_amount: order.sender.amount,
            required_signer_amount: required,
            fills,
            consumed,
            reduction,
        })
    }

    /// Apply a plan computed against the current state of `book`.
    pub fn commit(&self, book: &mut RuleBook, plan: &FillPlan) -> Result<()> {
        for &id in &plan.consumed {
            book.delete_rule(id)?;
        }
        if let Some((id, sender_taken)) = plan.reduction {
            book.reduce_rule(id, sender_taken)?;
        }
        Ok(())
    }

    /// Plan, settle, then commit.
    ///
    /// The settlement engine sees the order with an unset sender wallet
    /// filled in as the trade wallet. It is called exactly once per accepted
    /// order; on any error the book is untouched.
    pub fn provide_order(
        &self,
        book: &mut RuleBook,
        order: &Order,
        settlement: &impl SettlementEngine,
    ) -> Result<Fulfillment> {
        let plan = match self.plan(book, order) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(nonce = order.nonce, error = %err, "order rejected");
                return Err(err);
            }
        };

        let mut settled_order = order.clone();
        settled_order.sender.wallet = Some(self.trade_wallet);

        let receipt = match settlement.settle(&settled_order, plan.required_signer_amount) {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(nonce = order.nonce, error = %err, "settlement failed; fill discarded");
                return Err(err.into());
            }
        };

        self.commit(book, &plan)?;

        info!(
            nonce = order.nonce,
            sender_amount = plan.sender_amount,
            signer_amount = order.signer.amount,
            required = plan.required_signer_amount,
            rules_consumed = plan.consumed.len(),
            receipt = %receipt.digest_hex(),
            "order filled"
        );

        Ok(Fulfillment {
            receipt,
            fills: plan.fills,
            required_signer_amount: plan.required_signer_amount,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
