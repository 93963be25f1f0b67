//! # Delegate Book
//!
//! Standing price rules for a delegated trader.
//!
//! ## Architecture
//!
//! - **Types**: Core data structures (Rule, Order, Fill, SettlementReceipt)
//! - **Book**: Per-pair sorted rule lists in slab-backed storage
//! - **Quote**: Read-only signer-side, sender-side, max and depth quotes
//! - **Engine**: Order fulfillment with settlement as the commit point
//! - **Delegate**: Owner-gated facade with locking, events and persistence
//!
//! ## Design Principles
//!
//! 1. **Determinism**: Identical operations produce identical books and state roots
//! 2. **No Floating Point**: Rates are exact integer ratios compared in `u128`
//! 3. **Delegate-Favoring Rounding**: Takers pay `ceil`, receive `floor`
//! 4. **All or Nothing**: A failed order leaves the book untouched

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Rule, Order, Fill, SettlementReceipt
pub mod types;

/// Rule book: sorted pair lists with slab-based storage
pub mod book;

/// Quoting over the rule book
pub mod quote;

/// Order fulfillment
pub mod engine;

/// Settlement and token collaborators
pub mod settlement;

/// Owner-facing delegate
pub mod delegate;

/// SSZ snapshots and state roots
pub mod persistence;

pub mod config;
pub mod error;
pub mod logging;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use book::RuleBook;
pub use config::DelegateConfig;
pub use delegate::{Delegate, DelegateEvent};
pub use engine::OrderFulfillment;
pub use error::{DelegateError, ErrorCategory, Result, SettlementError};
pub use quote::{Level, QuoteEngine};
pub use settlement::{SettlementEngine, TokenView};
pub use types::{Address, Order, Party, Rule, RuleId, SettlementReceipt, TokenKind};
