//! Owner-facing delegate: the rule book behind access control.
//!
//! ## Locking
//!
//! Roles (owner, trade wallet, spender) and the book sit behind separate
//! `parking_lot::RwLock`s, always taken roles first. Writers hold the book
//! lock for the whole call, settlement included, so mutations are never
//! observed interleaved. Quotes take shared locks.
//!
//! ## Persistence
//!
//! With a `state_path` configured, the book is loaded on open and saved after
//! every committed mutation. Owner changes that cannot be saved are not
//! applied. A settled order stays applied even if its save fails.
//!
//! ## Example
//!
//! ```
//! use delegate_book::config::DelegateConfig;
//! use delegate_book::delegate::Delegate;
//! use delegate_book::types::Address;
//!
//! let owner = Address::from_low_u64(0xa0);
//! let spender = Address::from_low_u64(0xb0);
//! let (weth, dai) = (Address::from_low_u64(1), Address::from_low_u64(2));
//!
//! let delegate = Delegate::open(DelegateConfig::new(owner, spender)).unwrap();
//! delegate.create_rule(owner, weth, dai, 300, 50).unwrap();
//!
//! assert_eq!(delegate.get_signer_side_quote(300, weth, dai), 50);
//! assert!(delegate.create_rule(Address::from_low_u64(9), weth, dai, 1, 1).is_err());
//! ```

use std::mem;
use std::path::PathBuf;

use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use tracing::{error, info, warn};

use crate::book::RuleBook;
use crate::config::DelegateConfig;
use crate::engine::OrderFulfillment;
use crate::error::{DelegateError, Result};
use crate::quote::{Level, QuoteEngine};
use crate::settlement::{SettlementEngine, TokenView};
use crate::types::{Address, Order, RuleId, SettlementReceipt};

// ============================================================================
// Events
// ============================================================================

/// State change recorded by the delegate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelegateEvent {
    CreateRule {
        owner: Address,
        rule_id: RuleId,
        sender_token: Address,
        signer_token: Address,
        sender_amount: u64,
        signer_amount: u64,
    },
    DeleteRule {
        owner: Address,
        rule_id: RuleId,
    },
    ProvideOrder {
        owner: Address,
        nonce: u64,
        signer_wallet: Option<Address>,
        sender_token: Address,
        signer_token: Address,
        sender_amount: u64,
        signer_amount: u64,
        rules_touched: usize,
    },
    SetTradeWallet {
        trade_wallet: Address,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
}

#[derive(Debug, Clone, Copy)]
struct Roles {
    owner: Address,
    trade_wallet: Address,
    spender: Address,
}

impl Roles {
    fn ensure_owner(&self, caller: Address) -> Result<()> {
        if caller != self.owner {
            warn!(caller = %caller, "rejected non-owner call");
            return Err(DelegateError::NotOwner);
        }
        Ok(())
    }
}

// ============================================================================
// Delegate
// ============================================================================

/// A rule book owned by one account and traded from one wallet.
#[derive(Debug)]
pub struct Delegate {
    roles: RwLock<Roles>,
    book: RwLock<RuleBook>,
    events: Mutex<Vec<DelegateEvent>>,
    state_path: Option<PathBuf>,
}

impl Delegate {
    /// Open a delegate, loading its book from `state_path` if it exists.
    pub fn open(config: DelegateConfig) -> Result<Self> {
        config.validate()?;
        let book = match &config.state_path {
            Some(path) => RuleBook::load_or_new(path)?,
            None => RuleBook::new(),
        };
        Ok(Self::with_book(config, book))
    }

    /// Wrap an existing book
    pub fn with_book(config: DelegateConfig, book: RuleBook) -> Self {
        let roles = Roles {
            owner: config.owner,
            trade_wallet: config.effective_trade_wallet(),
            spender: config.spender,
        };
        info!(
            owner = %roles.owner,
            trade_wallet = %roles.trade_wallet,
            rules = book.rule_count(),
            "delegate opened"
        );
        Self {
            roles: RwLock::new(roles),
            book: RwLock::new(book),
            events: Mutex::new(Vec::new()),
            state_path: config.state_path,
        }
    }

    // ========================================================================
    // Roles
    // ========================================================================

    pub fn owner(&self) -> Address {
        self.roles.read().owner
    }

    pub fn trade_wallet(&self) -> Address {
        self.roles.read().trade_wallet
    }

    pub fn spender(&self) -> Address {
        self.roles.read().spender
    }

    /// Point fills at a new trade wallet.
    ///
    /// # Errors
    ///
    /// `NotOwner`, or `TradeWalletRequired` for the zero address.
    pub fn set_trade_wallet(&self, caller: Address, trade_wallet: Address) -> Result<()> {
        let mut roles = self.roles.write();
        roles.ensure_owner(caller)?;
        if trade_wallet.is_zero() {
            return Err(DelegateError::TradeWalletRequired);
        }
        roles.trade_wallet = trade_wallet;
        info!(trade_wallet = %trade_wallet, "trade wallet updated");
        self.emit(DelegateEvent::SetTradeWallet { trade_wallet });
        Ok(())
    }

    /// Hand the delegate to a new owner.
    ///
    /// # Errors
    ///
    /// `NotOwner`, or `Config` for the zero address.
    pub fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<()> {
        let mut roles = self.roles.write();
        roles.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(DelegateError::Config("new owner must be a nonzero address".into()));
        }
        let previous_owner = mem::replace(&mut roles.owner, new_owner);
        info!(previous = %previous_owner, owner = %new_owner, "ownership transferred");
        self.emit(DelegateEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    // ========================================================================
    // Rules
    // ========================================================================

    /// Post a rule offering `sender_amount` of `sender_token` for
    /// `signer_amount` of `signer_token`.
    pub fn create_rule(
        &self,
        caller: Address,
        sender_token: Address,
        signer_token: Address,
        sender_amount: u64,
        signer_amount: u64,
    ) -> Result<RuleId> {
        let roles = self.roles.read();
        roles.ensure_owner(caller)?;

        let mut book = self.book.write();
        let rule_id = self.commit_with(&mut book, |book| {
            book.create_rule(sender_token, signer_token, sender_amount, signer_amount)
        })?;
        self.emit(DelegateEvent::CreateRule {
            owner: roles.owner,
            rule_id,
            sender_token,
            signer_token,
            sender_amount,
            signer_amount,
        });
        Ok(rule_id)
    }

    /// Withdraw an active rule
    pub fn delete_rule(&self, caller: Address, rule_id: RuleId) -> Result<()> {
        let roles = self.roles.read();
        roles.ensure_owner(caller)?;

        let mut book = self.book.write();
        self.commit_with(&mut book, |book| book.delete_rule(rule_id))?;
        self.emit(DelegateEvent::DeleteRule {
            owner: roles.owner,
            rule_id,
        });
        Ok(())
    }

    // ========================================================================
    // Quotes
    // ========================================================================

    pub fn get_signer_side_quote(
        &self,
        sender_amount: u64,
        sender_token: Address,
        signer_token: Address,
    ) -> u64 {
        let book = self.book.read();
        QuoteEngine::new(&book).signer_side_quote(sender_amount, sender_token, signer_token)
    }

    pub fn get_sender_side_quote(
        &self,
        signer_amount: u64,
        signer_token: Address,
        sender_token: Address,
    ) -> u64 {
        let book = self.book.read();
        QuoteEngine::new(&book).sender_side_quote(signer_amount, signer_token, sender_token)
    }

    /// Largest quote the trade wallet's balance and allowance can back
    pub fn get_max_quote(
        &self,
        sender_token: Address,
        signer_token: Address,
        tokens: &impl TokenView,
    ) -> (u64, u64) {
        let roles = *self.roles.read();
        let book = self.book.read();
        QuoteEngine::new(&book).max_quote(
            sender_token,
            signer_token,
            roles.trade_wallet,
            roles.spender,
            tokens,
        )
    }

    pub fn get_levels(&self, sender_token: Address, signer_token: Address) -> Vec<Level> {
        let book = self.book.read();
        QuoteEngine::new(&book).levels(sender_token, signer_token)
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Fill `order` against the book and settle it through `settlement`.
    ///
    /// On any error, settlement failures included, the book is unchanged.
    pub fn provide_order(
        &self,
        order: &Order,
        settlement: &impl SettlementEngine,
    ) -> Result<SettlementReceipt> {
        let roles = self.roles.read();
        let mut book = self.book.write();

        let fulfillment =
            OrderFulfillment::new(roles.trade_wallet).provide_order(&mut book, order, settlement)?;

        self.emit(DelegateEvent::ProvideOrder {
            owner: roles.owner,
            nonce: order.nonce,
            signer_wallet: order.signer.wallet,
            sender_token: order.sender.token,
            signer_token: order.signer.token,
            sender_amount: order.sender.amount,
            signer_amount: order.signer.amount,
            rules_touched: fulfillment.fills.len(),
        });

        // Settled trades stand even if the snapshot write fails
        if let Err(err) = self.persist(&book) {
            error!(nonce = order.nonce, error = %err, "failed to persist book after fill");
        }
        Ok(fulfillment.receipt)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Shared view of the book
    pub fn book(&self) -> RwLockReadGuard<'_, RuleBook> {
        self.book.read()
    }

    pub fn state_root_hex(&self) -> Result<String> {
        self.book.read().state_root_hex()
    }

    /// Take every event recorded since the last drain
    pub fn drain_events(&self) -> Vec<DelegateEvent> {
        mem::take(&mut *self.events.lock())
    }

    fn emit(&self, event: DelegateEvent) {
        self.events.lock().push(event);
    }

    /// Apply `op` to `book`, durably when a state path is set.
    ///
    /// With a state path the change is made on a copy, and the copy replaces
    /// `book` only once it is saved. A failed save leaves `book` untouched.
    fn commit_with<T>(
        &self,
        book: &mut RuleBook,
        op: impl FnOnce(&mut RuleBook) -> Result<T>,
    ) -> Result<T> {
        let Some(path) = &self.state_path else {
            return op(book);
        };
        let mut staged = book.clone();
        let out = op(&mut staged)?;
        if let Err(err) = staged.save(path) {
            warn!(path = %path.display(), error = %err, "save failed; change discarded");
            return Err(err);
        }
        *book = staged;
        Ok(out)
    }

    fn persist(&self, book: &RuleBook) -> Result<()> {
        match &self.state_path {
            Some(path) => book.save(path),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SettlementError;
    use crate::types::Party;
    use std::collections::HashMap;

    fn owner() -> Address {
        Address::from_low_u64(0xa0)
    }

    fn spender() -> Address {
        Address::from_low_u64(0xb0)
    }

    fn stranger() -> Address {
        Address::from_low_u64(0xbad)
    }

    fn weth() -> Address {
        Address::from_low_u64(0xe1)
    }

    fn dai() -> Address {
        Address::from_low_u64(0xda)
    }

    fn delegate() -> Delegate {
        Delegate::open(DelegateConfig::new(owner(), spender())).unwrap()
    }

    struct Settles;

    impl SettlementEngine for Settles {
        fn settle(&self, order: &Order, _required: u64) -> std::result::Result<SettlementReceipt, SettlementError> {
            Ok(SettlementReceipt::new(
                order.nonce,
                order.signer.wallet.unwrap_or_default(),
                order.sender.wallet.unwrap_or_default(),
                order.signer.token,
                order.sender.token,
                order.signer.amount,
                order.sender.amount,
            ))
        }
    }

    struct Rejects;

    impl SettlementEngine for Rejects {
        fn settle(&self, order: &Order, _required: u64) -> std::result::Result<SettlementReceipt, SettlementError> {
            Err(SettlementError::NonceAlreadyUsed(order.nonce))
        }
    }

    struct Tokens(HashMap<Address, u64>);

    impl TokenView for Tokens {
        fn balance_of(&self, wallet: Address, _token: Address) -> u64 {
            self.0.get(&wallet).copied().unwrap_or(0)
        }

        fn allowance(&self, _owner: Address, approved: Address, _token: Address) -> u64 {
            if approved == spender() {
                u64::MAX
            } else {
                0
            }
        }
    }

    fn order(nonce: u64, sender_amount: u64, signer_amount: u64) -> Order {
        Order::new(
            nonce,
            0,
            Party::new(Some(Address::from_low_u64(0x71)), dai(), signer_amount),
            Party::new(None, weth(), sender_amount),
        )
    }

    #[test]
    fn test_roles_from_config() {
        let d = delegate();
        assert_eq!(d.trade_wallet(), owner());
        assert_eq!(d.spender(), spender());
    }

    #[test]
    fn test_only_owner_mutates_rules() {
        let d = delegate();
        assert!(matches!(
            d.create_rule(stranger(), weth(), dai(), 300, 50),
            Err(DelegateError::NotOwner)
        ));
        let id = d.create_rule(owner(), weth(), dai(), 300, 50).unwrap();
        assert!(matches!(d.delete_rule(stranger(), id), Err(DelegateError::NotOwner)));
        d.delete_rule(owner(), id).unwrap();
        assert!(matches!(
            d.delete_rule(owner(), id),
            Err(DelegateError::RuleNotActive(_))
        ));
    }

    #[test]
    fn test_set_trade_wallet() {
        let d = delegate();
        let wallet = Address::from_low_u64(0x77);
        assert!(matches!(
            d.set_trade_wallet(stranger(), wallet),
            Err(DelegateError::NotOwner)
        ));
        assert!(matches!(
            d.set_trade_wallet(owner(), Address::ZERO),
            Err(DelegateError::TradeWalletRequired)
        ));
        d.set_trade_wallet(owner(), wallet).unwrap();
        assert_eq!(d.trade_wallet(), wallet);
    }

    #[test]
    fn test_transfer_ownership() {
        let d = delegate();
        let next = Address::from_low_u64(0xa1);
        assert!(d.transfer_ownership(owner(), Address::ZERO).is_err());
        d.transfer_ownership(owner(), next).unwrap();

        assert!(matches!(
            d.create_rule(owner(), weth(), dai(), 1, 1),
            Err(DelegateError::NotOwner)
        ));
        d.create_rule(next, weth(), dai(), 1, 1).unwrap();
    }

    #[test]
    fn test_provide_order_fills_trade_wallet_and_emits() {
        let d = delegate();
        d.create_rule(owner(), weth(), dai(), 300, 50).unwrap();
        d.drain_events();

        let receipt = d.provide_order(&order(7, 300, 50), &Settles).unwrap();
        assert_eq!(receipt.sender_wallet, *owner().as_bytes());
        assert!(!d.book().is_pair_active(weth(), dai()));

        let events = d.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            DelegateEvent::ProvideOrder { nonce: 7, rules_touched: 1, .. }
        ));
        assert!(d.drain_events().is_empty());
    }

    #[test]
    fn test_failed_settlement_emits_nothing() {
        let d = delegate();
        d.create_rule(owner(), weth(), dai(), 300, 50).unwrap();
        d.drain_events();

        let err = d.provide_order(&order(7, 300, 50), &Rejects).unwrap_err();
        assert!(matches!(
            err,
            DelegateError::Settlement(SettlementError::NonceAlreadyUsed(7))
        ));
        assert!(d.drain_events().is_empty());
        assert_eq!(d.book().rule_count(), 1);
    }

    #[test]
    fn test_max_quote_uses_trade_wallet_balance() {
        let d = delegate();
        d.create_rule(owner(), weth(), dai(), 300, 50).unwrap();
        d.create_rule(owner(), weth(), dai(), 1000, 200).unwrap();

        let tokens = Tokens(HashMap::from([(owner(), 600)]));
        assert_eq!(d.get_max_quote(weth(), dai(), &tokens), (600, 110));

        let rich = Tokens(HashMap::from([(owner(), 1_000_000)]));
        assert_eq!(d.get_max_quote(weth(), dai(), &rich), (1300, 250));
    }

    #[test]
    fn test_levels_and_sender_quote() {
        let d = delegate();
        d.create_rule(owner(), weth(), dai(), 300, 50).unwrap();
        d.create_rule(owner(), weth(), dai(), 1000, 200).unwrap();

        let levels = d.get_levels(weth(), dai());
        assert_eq!(levels.iter().map(|l| l.rule_id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(d.get_sender_side_quote(50, dai(), weth()), 300);
        assert_eq!(d.get_sender_side_quote(10_000, dai(), weth()), 1300);
    }

    #[test]
    fn test_auto_persist_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DelegateConfig::new(owner(), spender());
        config.state_path = Some(dir.path().join("book.ssz"));

        let root = {
            let d = Delegate::open(config.clone()).unwrap();
            d.create_rule(owner(), weth(), dai(), 300, 50).unwrap();
            d.create_rule(owner(), weth(), dai(), 1000, 200).unwrap();
            d.delete_rule(owner(), 1).unwrap();
            d.provide_order(&order(1, 100, 20), &Settles).unwrap();
            d.state_root_hex().unwrap()
        };

        let reopened = Delegate::open(config).unwrap();
        assert_eq!(reopened.state_root_hex().unwrap(), root);
        assert_eq!(reopened.get_levels(weth(), dai())[0].sender_amount, 900);
        assert_eq!(reopened.create_rule(owner(), weth(), dai(), 1, 1).unwrap(), 3);
    }

    fn unsaveable_config() -> (tempfile::TempDir, DelegateConfig) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DelegateConfig::new(owner(), spender());
        config.state_path = Some(dir.path().join("missing").join("book.ssz"));
        (dir, config)
    }

    #[test]
    fn test_failed_save_discards_new_rule() {
        let (_dir, config) = unsaveable_config();
        let d = Delegate::open(config).unwrap();

        for _ in 0..2 {
            let err = d.create_rule(owner(), weth(), dai(), 300, 50).unwrap_err();
            assert!(matches!(err, DelegateError::Io(_)));
            assert_eq!(d.book().rule_count(), 0);
        }
        assert!(d.drain_events().is_empty());
        assert_eq!(d.get_signer_side_quote(300, weth(), dai()), 0);
    }

    #[test]
    fn test_failed_save_keeps_deleted_rule() {
        let (_dir, config) = unsaveable_config();
        let mut book = RuleBook::new();
        book.create_rule(weth(), dai(), 300, 50).unwrap();
        let d = Delegate::with_book(config, book);
        let root = d.state_root_hex().unwrap();

        assert!(matches!(d.delete_rule(owner(), 1), Err(DelegateError::Io(_))));
        assert_eq!(d.book().rule_count(), 1);
        assert_eq!(d.state_root_hex().unwrap(), root);
        assert!(d.drain_events().is_empty());
        assert_eq!(d.get_signer_side_quote(300, weth(), dai()), 50);
    }

    #[test]
    fn test_concurrent_writers_keep_invariants() {
        let d = delegate();
        std::thread::scope(|s| {
            for t in 0..4u64 {
                let d = &d;
                s.spawn(move || {
                    for i in 1..=50u64 {
                        d.create_rule(owner(), weth(), dai(), 100 + i * (t + 1), 10 + i).unwrap();
                        let _ = d.get_signer_side_quote(500, weth(), dai());
                    }
                });
            }
        });

        let book = d.book();
        assert_eq!(book.active_count(weth(), dai()), 200);
        book.check_invariants().unwrap();
    }
}
