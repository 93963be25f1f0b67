//! Order fulfillment module for the delegate.
//!
//! ## Design Principles
//!
//! 1. **Compute, then commit**: the full set of rule changes is derived
//!    before anything is mutated
//! 2. **Settlement is the commit point**: rule changes apply only after the
//!    settlement engine accepts the order
//! 3. **Best rate first**: rules are consumed from the head of the pair list
//! 4. **Delegate-favoring rounding**: the taker's cost is rounded up
//!
//! ## Example
//!
//! ```
//! use delegate_book::book::RuleBook;
//! use delegate_book::engine::OrderFulfillment;
//! use delegate_book::types::{Address, Order, Party};
//!
//! let weth = Address::from_low_u64(1);
//! let dai = Address::from_low_u64(2);
//! let trade_wallet = Address::from_low_u64(3);
//!
//! let mut book = RuleBook::new();
//! book.create_rule(weth, dai, 300, 50).unwrap();
//!
//! let order = Order::new(1, 0, Party::new(None, dai, 50), Party::new(None, weth, 300));
//! let plan = OrderFulfillment::new(trade_wallet).plan(&book, &order).unwrap();
//!
//! assert_eq!(plan.required_signer_amount, 50);
//! assert_eq!(plan.consumed.len(), 1);
//! // Planning never mutates the book
//! assert_eq!(book.rule_count(), 1);
//! ```

pub mod fulfillment;

pub use fulfillment::{FillPlan, Fulfillment, OrderFulfillment};
