//! Signed-order types handed to the delegate by a taker.
//!
//! The delegate only reads the economic fields of an order (parties, tokens,
//! amounts, kinds). Signatures, nonces, and expiry belong to the settlement
//! engine and are carried through untouched.

use crate::types::address::Address;

// ============================================================================
// TokenKind
// ============================================================================

/// Token standard of one side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenKind {
    /// Divisible balance token (ERC-20 style)
    #[default]
    Fungible,
    /// Unique token (ERC-721 style)
    NonFungible,
    /// Multi-token with ids and balances (ERC-1155 style)
    SemiFungible,
}

impl TokenKind {
    #[inline]
    pub fn is_fungible(self) -> bool {
        matches!(self, TokenKind::Fungible)
    }
}

// ============================================================================
// Party
// ============================================================================

/// One side of an order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Party {
    /// Token standard
    pub kind: TokenKind,

    /// Wallet for this side; `None` leaves it open (public order)
    pub wallet: Option<Address>,

    /// Token transferred from this side
    pub token: Address,

    /// Amount transferred from this side
    pub amount: u64,
}

impl Party {
    /// A fungible party
    pub fn new(wallet: Option<Address>, token: Address, amount: u64) -> Self {
        Self {
            kind: TokenKind::Fungible,
            wallet,
            token,
            amount,
        }
    }

    pub fn with_kind(mut self, kind: TokenKind) -> Self {
        self.kind = kind;
        self
    }
}

// ============================================================================
// Order
// ============================================================================

/// A taker's order against the delegate.
///
/// The signer gives `signer.amount` of `signer.token`; the delegate (sender)
/// gives `sender.amount` of `sender.token` from its trade wallet.
///
/// ## Example
///
/// ```
/// use delegate_book::types::{Address, Order, Party};
///
/// let taker = Address::from_low_u64(0x71);
/// let weth = Address::from_low_u64(0x01);
/// let dai = Address::from_low_u64(0x02);
///
/// let order = Order::new(
///     1,                                  // nonce
///     1_703_577_600,                      // expiry
///     Party::new(Some(taker), dai, 497),  // signer gives 497 DAI
///     Party::new(None, weth, 3135),       // delegate gives 3135 WETH
/// );
/// assert_eq!(order.pair().sender_token, weth);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Order {
    /// Replay protection, checked by the settlement engine
    pub nonce: u64,

    /// Expiry timestamp (seconds), checked by the settlement engine
    pub expiry: u64,

    /// Taker side
    pub signer: Party,

    /// Delegate side
    pub sender: Party,

    /// Optional affiliate payout
    pub affiliate: Option<Party>,

    /// Opaque signature bytes
    pub signature: Vec<u8>,
}

impl Order {
    pub fn new(nonce: u64, expiry: u64, signer: Party, sender: Party) -> Self {
        Self {
            nonce,
            expiry,
            signer,
            sender,
            affiliate: None,
            signature: Vec::new(),
        }
    }

    /// The rule-book pair this order trades against
    pub fn pair(&self) -> crate::types::PairKey {
        crate::types::PairKey::new(self.sender.token, self.signer.token)
    }
}
