//! Rule book module for the delegate.
//!
//! ## Architecture
//!
//! The book keeps one sorted doubly linked list of rules per token pair:
//!
//! - **Arena storage**: rules live in a slab, addressed by rule ID
//! - **Pair lists**: rules linked best rate first, FIFO among equal rates
//! - **Monotonic IDs**: rule IDs are never reused
//!
//! ## Components
//!
//! - [`RuleStore`]: Arena of rules plus the rule ID counter
//! - [`PairIndex`]: Head pointer and active count of one pair's list
//! - [`RuleBook`]: Creation and deletion, maintaining both
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Create rule | O(k) for k rules on the pair |
//! | Delete rule by ID | O(1) |
//! | Lookup by ID | O(1) |
//! | Walk a pair | O(k) |

pub mod pair;
pub mod rulebook;
pub mod store;

pub use pair::{PairIndex, PairIter};
pub use rulebook::RuleBook;
pub use store::RuleStore;
