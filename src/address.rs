//! TRON account and contract addresses
//!
//! A TRON address is 21 bytes: the `0x41` network prefix followed by the
//! 20-byte account id. Users see it base58check-encoded (`T...`), the full
//! node also accepts the hex form (`41...`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Prefix byte of every mainnet/testnet TRON address
pub const ADDRESS_PREFIX: u8 = 0x41;

/// Length of a TRON address in bytes, including the prefix
pub const ADDRESS_LEN: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TronAddress([u8; ADDRESS_LEN]);

impl TronAddress {
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Result<Self, Error> {
        if bytes[0] != ADDRESS_PREFIX {
            return Err(Error::Address(format!(
                "unexpected address prefix 0x{:02x}",
                bytes[0]
            )));
        }
        Ok(Self(bytes))
    }

    /// Build an address from the 20-byte account id used inside ABI words
    pub fn from_account_id(id: [u8; 20]) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[0] = ADDRESS_PREFIX;
        bytes[1..].copy_from_slice(&id);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// The 20-byte account id, without the network prefix
    pub fn account_id(&self) -> [u8; 20] {
        let mut id = [0u8; 20];
        id.copy_from_slice(&self.0[1..]);
        id
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).with_check().into_string()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Whether the account id is all zeroes (the factory returns this for
    /// tokens without an exchange)
    pub fn is_zero(&self) -> bool {
        self.0[1..].iter().all(|b| *b == 0)
    }

    fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            Error::Address(format!(
                "expected {} bytes, got {}",
                ADDRESS_LEN,
                bytes.len()
            ))
        })?;
        Self::from_bytes(bytes)
    }
}

impl FromStr for TronAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('T') {
            let decoded = bs58::decode(s)
                .with_check(None)
                .into_vec()
                .map_err(|e| Error::Address(format!("invalid base58 address {}: {}", s, e)))?;
            return Self::from_slice(&decoded);
        }

        let hex_part = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(hex_part)
            .map_err(|e| Error::Address(format!("invalid hex address {}: {}", s, e)))?;
        match decoded.len() {
            20 => {
                let mut id = [0u8; 20];
                id.copy_from_slice(&decoded);
                Ok(Self::from_account_id(id))
            }
            _ => Self::from_slice(&decoded),
        }
    }
}

impl TryFrom<String> for TronAddress {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TronAddress> for String {
    fn from(address: TronAddress) -> Self {
        address.to_base58()
    }
}

impl fmt::Display for TronAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // USDT on TRON mainnet
    const USDT: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";
    const USDT_HEX: &str = "41a614f803b6fd780986a42c78ec9c7f77e6ded13c";

    #[test]
    fn base58_and_hex_forms_agree() {
        let from_base58: TronAddress = USDT.parse().unwrap();
        let from_hex: TronAddress = USDT_HEX.parse().unwrap();
        assert_eq!(from_base58, from_hex);
        assert_eq!(from_base58.to_string(), USDT);
        assert_eq!(from_hex.to_hex(), USDT_HEX);
    }

    #[test]
    fn account_id_form_gets_prefixed() {
        let bare: TronAddress = "0xa614f803b6fd780986a42c78ec9c7f77e6ded13c".parse().unwrap();
        assert_eq!(bare.to_string(), USDT);
    }

    #[test]
    fn rejects_bad_checksum() {
        assert!("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6u".parse::<TronAddress>().is_err());
        assert!("not-an-address".parse::<TronAddress>().is_err());
    }

    #[test]
    fn zero_account_is_detected() {
        assert!(TronAddress::from_account_id([0u8; 20]).is_zero());
        assert!(!USDT.parse::<TronAddress>().unwrap().is_zero());
    }
}
