//! Core data types for the delegate rule book
//!
//! Persisted and hashed types implement SSZ serialization for deterministic
//! encoding. All amounts are `u64` in the token's smallest unit.
//!
//! ## Types
//!
//! - [`Address`]: 20-byte wallet/token identifier
//! - [`Rule`]: A standing price rule, linked into its pair's list
//! - [`PairKey`]: `(sender_token, signer_token)`
//! - [`Order`] / [`Party`] / [`TokenKind`]: A taker's signed order
//! - [`Fill`]: The portion of a rule used by an order
//! - [`SettlementReceipt`]: What the settlement engine transferred
//!
//! ## Rates
//!
//! Rates are compared by cross-multiplication in `u128`; see [`rate`].

mod address;
mod fill;
mod order;
mod receipt;
mod rule;
pub mod rate;

// Re-export all types at module level
pub use address::{Address, ParseAddressError, ADDRESS_LEN};
pub use fill::Fill;
pub use order::{Order, Party, TokenKind};
pub use receipt::SettlementReceipt;
pub use rule::{PairKey, Rule, RuleId, NO_RULE};
