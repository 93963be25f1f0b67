//! Interfaces to the external collaborators of the rule book.
//!
//! The delegate never moves tokens itself. It asks a [`SettlementEngine`] to
//! verify and settle an order, and reads balances and allowances through a
//! [`TokenView`].

use crate::error::SettlementError;
use crate::types::{Address, Order, SettlementReceipt};

/// Verifies a signed order and performs its token transfers.
///
/// Implementations check signer authorization (the signer itself or an
/// authorized signatory), nonce and expiry, then transfer both sides and any
/// protocol fee. Either the whole settlement happens or an error is returned.
pub trait SettlementEngine {
    /// Settle `order`. `required_signer_amount` is the minimum the delegate's
    /// rules demand from the signer; the order's own signer amount is at least
    /// this much.
    fn settle(
        &self,
        order: &Order,
        required_signer_amount: u64,
    ) -> Result<SettlementReceipt, SettlementError>;
}

/// Read-only token balance and allowance lookups.
pub trait TokenView {
    /// Balance of `token` held by `wallet`
    fn balance_of(&self, wallet: Address, token: Address) -> u64;

    /// Amount of `token` that `owner` has approved `spender` to move
    fn allowance(&self, owner: Address, spender: Address, token: Address) -> u64;
}

impl<T: SettlementEngine + ?Sized> SettlementEngine for &T {
    fn settle(
        &self,
        order: &Order,
        required_signer_amount: u64,
    ) -> Result<SettlementReceipt, SettlementError> {
        (**self).settle(order, required_signer_amount)
    }
}

impl<T: TokenView + ?Sized> TokenView for &T {
    fn balance_of(&self, wallet: Address, token: Address) -> u64 {
        (**self).balance_of(wallet, token)
    }

    fn allowance(&self, owner: Address, spender: Address, token: Address) -> u64 {
        (**self).allowance(owner, spender, token)
    }
}
