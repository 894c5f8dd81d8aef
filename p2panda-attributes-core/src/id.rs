// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Size of attribute identifiers.
pub const ATTRIBUTE_ID_LEN: usize = blake3::KEY_LEN;

/// 32-byte content-addressed identifier of an attribute.
///
/// Locally created attributes derive their id from the BLAKE3 hash of their encoded content,
/// creation time and a random salt (see [`AttributeId::from_content`]). Attributes received from
/// peers keep the id the peer assigned to them.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeId(blake3::Hash);

impl AttributeId {
    /// Calculate an id from the provided bytes.
    pub fn new(buf: impl AsRef<[u8]>) -> Self {
        Self(blake3::hash(buf.as_ref()))
    }

    /// Derive an id from encoded attribute content.
    ///
    /// The salt makes two attributes with equal content created at the same moment distinct.
    pub fn from_content(content: &[u8], created_at: u64, salt: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(content);
        hasher.update(&created_at.to_be_bytes());
        hasher.update(salt);
        Self(hasher.finalize())
    }

    /// Create an `AttributeId` from its raw bytes representation.
    pub const fn from_bytes(bytes: [u8; ATTRIBUTE_ID_LEN]) -> Self {
        Self(blake3::Hash::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ATTRIBUTE_ID_LEN] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl AsRef<[u8]> for AttributeId {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<[u8; ATTRIBUTE_ID_LEN]> for AttributeId {
    fn from(value: [u8; ATTRIBUTE_ID_LEN]) -> Self {
        Self::from_bytes(value)
    }
}

impl TryFrom<&[u8]> for AttributeId {
    type Error = AttributeIdError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let value_len = value.len();

        let checked_value: [u8; ATTRIBUTE_ID_LEN] = value
            .try_into()
            .map_err(|_| AttributeIdError::InvalidLength(value_len, ATTRIBUTE_ID_LEN))?;

        Ok(Self::from_bytes(checked_value))
    }
}

impl FromStr for AttributeId {
    type Err = AttributeIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::try_from(hex::decode(value)?.as_slice())
    }
}

impl PartialOrd for AttributeId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AttributeId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.as_bytes().cmp(other.0.as_bytes())
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AttributeId").field(&self.to_hex()).finish()
    }
}

impl Serialize for AttributeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AttributeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value
            .parse()
            .map_err(|err: AttributeIdError| serde::de::Error::custom(err.to_string()))
    }
}

/// Error types for `AttributeId` struct.
#[derive(Error, Debug)]
pub enum AttributeIdError {
    /// Id has an invalid length.
    #[error("invalid attribute id length {0} bytes, expected {1} bytes")]
    InvalidLength(usize, usize),

    /// Id contains invalid hex characters.
    #[error(transparent)]
    InvalidHexEncoding(#[from] hex::FromHexError),
}

/// Reference to the message, request or notification through which an attribute was shared.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reference(String);

impl Reference {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Reference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
