//! Settlement receipt returned by the external settlement engine.
//!
//! The receipt records what was actually transferred. It is produced by the
//! settlement engine and passed back unchanged by `provide_order`.

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use crate::types::address::{Address, ADDRESS_LEN};

/// Summary of a settled order.
///
/// ## Digest
///
/// `digest()` is the SHA-256 of the receipt's SSZ encoding, usable as a
/// compact identifier in logs.
///
/// ## Example
///
/// ```
/// use delegate_book::types::{Address, SettlementReceipt};
///
/// let receipt = SettlementReceipt::new(
///     7,                          // nonce
///     Address::from_low_u64(1),   // signer wallet
///     Address::from_low_u64(2),   // sender wallet
///     Address::from_low_u64(3),   // signer token
///     Address::from_low_u64(4),   // sender token
///     497,                        // signer amount
///     3135,                       // sender amount
/// );
/// assert_eq!(receipt.digest_hex().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct SettlementReceipt {
    /// Order nonce consumed by the settlement
    pub nonce: u64,

    /// Taker wallet
    pub signer_wallet: [u8; ADDRESS_LEN],

    /// Delegate trade wallet
    pub sender_wallet: [u8; ADDRESS_LEN],

    /// Token paid by the taker
    pub signer_token: [u8; ADDRESS_LEN],

    /// Token paid by the delegate
    pub sender_token: [u8; ADDRESS_LEN],

    /// Amount paid by the taker
    pub signer_amount: u64,

    /// Amount paid by the delegate
    pub sender_amount: u64,

    /// Protocol fee charged by the settlement engine, if any
    pub fee_amount: u64,
}

impl SettlementReceipt {
    pub fn new(
        nonce: u64,
        signer_wallet: Address,
        sender_wallet: Address,
        signer_token: Address,
        sender_token: Address,
        signer_amount: u64,
        sender_amount: u64,
    ) -> Self {
        Self {
            nonce,
            signer_wallet: signer_wallet.0,
            sender_wallet: sender_wallet.0,
            signer_token: signer_token.0,
            sender_token: sender_token.0,
            signer_amount,
            sender_amount,
            fee_amount: 0,
        }
    }

    pub fn with_fee(mut self, fee_amount: u64) -> Self {
        self.fee_amount = fee_amount;
        self
    }

    /// SHA-256 of the SSZ encoding
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        // Fixed-size container; encoding cannot fail.
        if let Ok(bytes) = ssz_rs::serialize(self) {
            hasher.update(&bytes);
        }
        let result = hasher.finalize();

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}
