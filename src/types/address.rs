//! 20-byte account and token identifiers.
//!
//! Addresses are rendered and parsed as `0x`-prefixed lowercase hex. The
//! all-zero address is the "unset" value used by the settlement layer; the
//! book itself never stores it as a token.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length of an address in bytes
pub const ADDRESS_LEN: usize = 20;

/// An account, wallet, or token identifier.
///
/// ## Example
///
/// ```
/// use delegate_book::types::Address;
///
/// let token: Address = "0x00000000000000000000000000000000000000aa".parse().unwrap();
/// assert_eq!(token, Address::from_low_u64(0xaa));
/// assert_eq!(token.to_string(), "0x00000000000000000000000000000000000000aa");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The unset address
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Build an address whose low 8 bytes hold `value` (big-endian).
    ///
    /// Handy for tests and fixtures.
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 8..].copy_from_slice(&value.to_be_bytes());
        Address(bytes)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Error returned when an address string is malformed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address '{0}': expected 0x followed by 40 hex digits")]
pub struct ParseAddressError(pub String);

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| ParseAddressError(s.to_string()))?;
        Ok(Address(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
