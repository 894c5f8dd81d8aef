// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of an address string.
pub const MAX_ADDRESS_LEN: usize = 100;

/// Identity address of a party, for example the local account or one of its peers.
///
/// Addresses are opaque to this crate, they are handed to us by the account layer. We only make
/// sure they are non-empty, bounded in size and free of whitespace or control characters so they
/// can be safely compared and logged.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Result<Self, AddressError> {
        let value = value.into();

        if value.is_empty() {
            return Err(AddressError::Empty);
        }

        if value.len() > MAX_ADDRESS_LEN {
            return Err(AddressError::TooLong(value.len(), MAX_ADDRESS_LEN));
        }

        if let Some(invalid) = value
            .chars()
            .find(|c| c.is_whitespace() || c.is_control())
        {
            return Err(AddressError::InvalidCharacter(invalid));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address").field(&self.0).finish()
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address can not be empty")]
    Empty,

    #[error("address has invalid length {0}, expected at most {1} bytes")]
    TooLong(usize, usize),

    #[error("address contains invalid character {0:?}")]
    InvalidCharacter(char),
}
