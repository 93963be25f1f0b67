//! Exact rate arithmetic for rule amounts.
//!
//! ## Overview
//!
//! A rule's rate is `sender_amount / signer_amount`. Rates are never stored
//! as fractions: they are compared by cross-multiplication and applied with
//! integer `mul_div` helpers that round in a declared direction.
//!
//! All amounts are `u64` in the token's smallest unit; every product is
//! formed in `u128` so no intermediate overflows.
//!
//! ## Rounding Policy
//!
//! | Quantity | Rounding | Beneficiary |
//! |----------|----------|-------------|
//! | signer amount owed to the delegate | up | delegate |
//! | sender amount paid by the delegate | down | delegate |
//!
//! ## Example
//!
//! ```
//! use std::cmp::Ordering;
//! use delegate_book::types::rate::{compare_rates, mul_div_ceil, mul_div_floor};
//!
//! // 2002/286 (= 7.0) beats 300/50 (= 6.0)
//! assert_eq!(compare_rates(2002, 286, 300, 50), Ordering::Greater);
//!
//! assert_eq!(mul_div_ceil(320, 833, 1664), 161);
//! assert_eq!(mul_div_floor(1664, 100, 320), 520);
//! ```

use std::cmp::Ordering;

use rust_decimal::Decimal;

/// Decimal places used when rendering a price
pub const PRICE_DISPLAY_DP: u32 = 8;

/// Compare the rate `a_sender / a_signer` against `b_sender / b_signer`.
///
/// Both denominators must be nonzero.
#[inline]
pub fn compare_rates(a_sender: u64, a_signer: u64, b_sender: u64, b_signer: u64) -> Ordering {
    let lhs = a_sender as u128 * b_signer as u128;
    let rhs = b_sender as u128 * a_signer as u128;
    lhs.cmp(&rhs)
}

/// `ceil(a * b / c)` for `c > 0`.
///
/// Callers guarantee `b <= c`, which bounds the result by `a`.
#[inline]
pub fn mul_div_ceil(a: u64, b: u64, c: u64) -> u64 {
    debug_assert!(c > 0 && b <= c);
    let product = a as u128 * b as u128;
    let divisor = c as u128;
    let quotient = product / divisor;
    let result = if product % divisor == 0 { quotient } else { quotient + 1 };
    result as u64
}

/// `floor(a * b / c)` for `c > 0`.
///
/// Callers guarantee `b <= c`, which bounds the result by `a`.
#[inline]
pub fn mul_div_floor(a: u64, b: u64, c: u64) -> u64 {
    debug_assert!(c > 0 && b <= c);
    (a as u128 * b as u128 / c as u128) as u64
}

/// Price of a rule as signer tokens per sender token, for display only.
///
/// Returns `None` if `sender_amount` is zero.
pub fn price(sender_amount: u64, signer_amount: u64) -> Option<Decimal> {
    if sender_amount == 0 {
        return None;
    }
    Decimal::from(signer_amount)
        .checked_div(Decimal::from(sender_amount))
        .map(|p| p.round_dp(PRICE_DISPLAY_DP))
}
