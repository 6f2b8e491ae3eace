//! 32-byte account addresses.
//!
//! Addresses are raw 32-byte values. Their human-readable form is Base58
//! (Bitcoin alphabet), the same text encoding the remote ledger uses.
//! An address is either an Ed25519 public key (on the curve, can sign) or a
//! program-derived address (off the curve, only its owning program can
//! authorize it). See [`crate::pda`].

use curve25519_dalek::edwards::CompressedEdwardsY;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::constants::{SYSTEM_PROGRAM_ID, SYSVAR_CLOCK_ID, SYSVAR_RENT_ID, TOKEN_PROGRAM_ID};
use crate::error::AddressError;

/// Byte length of an address.
pub const ADDRESS_LEN: usize = 32;

/// A 32-byte ledger address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The all-zero address. Used as the "none" sentinel in account records.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    /// Create an address from a byte array.
    pub const fn new_from_array(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Create an address from a slice, which must be exactly 32 bytes.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let arr: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Copy out the underlying bytes.
    pub fn to_bytes(self) -> [u8; ADDRESS_LEN] {
        self.0
    }

    /// Check if this is the all-zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Whether these bytes decompress to a point on the Ed25519 curve.
    ///
    /// Program-derived addresses are exactly the ones for which this is false.
    pub fn is_on_curve(&self) -> bool {
        bytes_are_curve_point(&self.0)
    }

    /// Base58 text form.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Parse a Base58 string.
    pub fn from_base58(s: &str) -> Result<Self, AddressError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;
        Self::try_from_slice(&bytes)
    }
}

/// Ed25519 point-decompression check on raw bytes.
pub fn bytes_are_curve_point(bytes: &[u8; ADDRESS_LEN]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base58(&s).map_err(serde::de::Error::custom)
    }
}

fn well_known(id: &'static str) -> Address {
    Address::from_base58(id).expect("well-known program id is valid base58")
}

/// The rent sysvar.
pub static SYSVAR_RENT: LazyLock<Address> = LazyLock::new(|| well_known(SYSVAR_RENT_ID));

/// The clock sysvar.
pub static SYSVAR_CLOCK: LazyLock<Address> = LazyLock::new(|| well_known(SYSVAR_CLOCK_ID));

/// The SPL token program.
pub static TOKEN_PROGRAM: LazyLock<Address> = LazyLock::new(|| well_known(TOKEN_PROGRAM_ID));

/// The system program.
pub static SYSTEM_PROGRAM: LazyLock<Address> = LazyLock::new(|| well_known(SYSTEM_PROGRAM_ID));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base58_roundtrip() {
        let s = "2BmEn6gnEDEPstnVW8Ek7gAmsVRhK5J9V1h6idSvcSrQ";
        let addr: Address = s.parse().unwrap();
        assert_eq!(addr.to_string(), s);
    }

    #[test]
    fn base58_known_bytes() {
        let addr = Address::from_base58("2BmEn6gnEDEPstnVW8Ek7gAmsVRhK5J9V1h6idSvcSrQ").unwrap();
        assert_eq!(&addr.as_bytes()[..4], &[0x11, 0x9d, 0x83, 0xba]);
    }

    #[test]
    fn zero_is_system_program() {
        assert_eq!(*SYSTEM_PROGRAM, Address::ZERO);
        assert!(Address::ZERO.is_zero());
        assert_eq!(Address::ZERO.to_string(), SYSTEM_PROGRAM_ID);
    }

    #[test]
    fn well_known_ids_parse() {
        assert_eq!(SYSVAR_RENT.to_string(), SYSVAR_RENT_ID);
        assert_eq!(SYSVAR_CLOCK.to_string(), SYSVAR_CLOCK_ID);
        assert_eq!(TOKEN_PROGRAM.to_string(), TOKEN_PROGRAM_ID);
        assert_ne!(*SYSVAR_RENT, *SYSVAR_CLOCK);
    }

    #[test]
    fn invalid_base58_rejected() {
        let err = Address::from_base58("0OIl").unwrap_err();
        assert!(matches!(err, AddressError::InvalidBase58(_)));
    }

    #[test]
    fn wrong_length_rejected() {
        let short = bs58::encode([1u8; 31]).into_string();
        assert_eq!(
            Address::from_base58(&short).unwrap_err(),
            AddressError::InvalidLength(31)
        );
    }

    #[test]
    fn ed25519_public_key_is_on_curve() {
        let sk = ed25519_dalek::SigningKey::from_bytes(&[7u8; 32]);
        let addr = Address(sk.verifying_key().to_bytes());
        assert!(addr.is_on_curve());
    }

    #[test]
    fn some_bytes_are_off_curve() {
        // About half of all 32-byte strings fail decompression.
        let found = (0u8..=40).any(|i| {
            let mut bytes = [0u8; 32];
            bytes[0] = i;
            !Address(bytes).is_on_curve()
        });
        assert!(found, "expected an off-curve value among small y coordinates");
    }

    #[test]
    fn serde_json_roundtrip() {
        let addr = Address([9u8; 32]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_base58()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn debug_shows_base58() {
        let addr = Address([1u8; 32]);
        assert_eq!(format!("{addr:?}"), format!("Address({addr})"));
    }
}
