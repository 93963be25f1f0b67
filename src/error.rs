//! Error types for the delegate rule book.
//!
//! Every fallible operation returns [`DelegateError`]. Errors are grouped into
//! categories via [`DelegateError::category`]; none are retried internally.

use thiserror::Error;

use crate::types::RuleId;

/// Failure reported by the external settlement engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("order signature is invalid")]
    SignatureInvalid,
    #[error("order has expired")]
    Expired,
    #[error("order nonce {0} already used")]
    NonceAlreadyUsed(u64),
    #[error("signer is not authorized")]
    Unauthorized,
    #[error("token transfer failed: {0}")]
    TransferFailed(String),
}

/// Coarse grouping of [`DelegateError`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad input; surfaced synchronously
    Validation,
    /// Caller lacks the capability for the operation
    Authorization,
    /// Settlement engine rejected the trade; rule state was rolled back
    Settlement,
    /// Durable state could not be read or written
    Persistence,
}

/// Main error type
#[derive(Error, Debug)]
pub enum DelegateError {
    // === Validation ===
    #[error("rule amounts must both be nonzero")]
    AmountsZero,
    #[error("rule {0} is not active")]
    RuleNotActive(RuleId),
    #[error("token pair has no active rules")]
    TokenPairInactive,
    #[error("order price is below the posted rules or exceeds their capacity")]
    PriceInvalid,
    #[error("signer token kind must be fungible")]
    SignerKindNotFungible,
    #[error("sender token kind must be fungible")]
    SenderKindNotFungible,
    #[error("trade wallet must be a nonzero address")]
    TradeWalletRequired,

    // === Authorization ===
    #[error("caller is not the owner")]
    NotOwner,
    #[error("order sender wallet is not the trade wallet")]
    SenderWalletInvalid,

    // === Settlement ===
    #[error("settlement failed: {0}")]
    Settlement(#[from] SettlementError),

    // === Persistence ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
    #[error("config error: {0}")]
    Config(String),
}

impl DelegateError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DelegateError::AmountsZero
            | DelegateError::RuleNotActive(_)
            | DelegateError::TokenPairInactive
            | DelegateError::PriceInvalid
            | DelegateError::SignerKindNotFungible
            | DelegateError::SenderKindNotFungible
            | DelegateError::TradeWalletRequired => ErrorCategory::Validation,
            DelegateError::NotOwner | DelegateError::SenderWalletInvalid => {
                ErrorCategory::Authorization
            }
            DelegateError::Settlement(_) => ErrorCategory::Settlement,
            DelegateError::Io(_)
            | DelegateError::Encoding(_)
            | DelegateError::CorruptSnapshot(_)
            | DelegateError::Config(_) => ErrorCategory::Persistence,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, DelegateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(DelegateError::AmountsZero.category(), ErrorCategory::Validation);
        assert_eq!(DelegateError::RuleNotActive(4).category(), ErrorCategory::Validation);
        assert_eq!(DelegateError::NotOwner.category(), ErrorCategory::Authorization);
        assert_eq!(
            DelegateError::SenderWalletInvalid.category(),
            ErrorCategory::Authorization
        );
        assert_eq!(
            DelegateError::from(SettlementError::Expired).category(),
            ErrorCategory::Settlement
        );
        assert_eq!(
            DelegateError::CorruptSnapshot("x".into()).category(),
            ErrorCategory::Persistence
        );
    }

    #[test]
    fn test_settlement_reason_is_visible() {
        let err = DelegateError::from(SettlementError::NonceAlreadyUsed(9));
        assert_eq!(err.to_string(), "settlement failed: order nonce 9 already used");
    }
}
