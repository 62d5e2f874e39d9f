//! 32-byte account identifiers and their canonical hex form.

use std::fmt;
use std::str::FromStr;

/// A fixed 32-byte account identifier.
///
/// Equality is byte-equal. The canonical string form used as a map key
/// throughout the cache layer is a 64-character lowercase hex string, not
/// base58 -- hex keeps key derivation and comparisons allocation-free where
/// it matters and avoids pulling a base58 codec into every hot path. Base58
/// is still used at the wire edges (ingest decoders, instruction encoding)
/// via [`Pubkey::to_base58`] / [`Pubkey::from_base58`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pubkey([u8; 32]);

impl Pubkey {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const ZERO: Pubkey = Pubkey([0u8; 32]);

    pub fn from_slice(bytes: &[u8]) -> Result<Self, PubkeyError> {
        if bytes.len() != 32 {
            return Err(PubkeyError::WrongLength(bytes.len()));
        }
        let mut buf = [0u8; 32];
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Canonical 64-character hex form, used as the key in every cache.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, PubkeyError> {
        if s.len() != 64 {
            return Err(PubkeyError::WrongHexLength(s.len()));
        }
        let bytes = hex::decode(s).map_err(|_| PubkeyError::InvalidHex)?;
        Self::from_slice(&bytes)
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }

    pub fn from_base58(s: &str) -> Result<Self, PubkeyError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| PubkeyError::InvalidBase58)?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Pubkey {
    type Err = PubkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 64 {
            Self::from_hex(s)
        } else {
            Self::from_base58(s)
        }
    }
}

impl serde::Serialize for Pubkey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Pubkey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PubkeyError {
    #[error("expected 32 bytes, got {0}")]
    WrongLength(usize),
    #[error("expected 64 hex characters, got {0}")]
    WrongHexLength(usize),
    #[error("invalid hex encoding")]
    InvalidHex,
    #[error("invalid base58 encoding")]
    InvalidBase58,
}
