//! Public tracking references for tickets submitted through the portal

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const PREFIX: &str = "CT";

/// Reference number handed to anonymous clients, e.g. `CT000042`
///
/// The numeric part is the backend's client ticket id, zero padded to at
/// least six digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceNumber(u64);

impl ReferenceNumber {
    /// Create a reference from a client ticket id
    #[must_use]
    pub const fn from_id(id: u64) -> Self {
        Self(id)
    }

    /// The client ticket id encoded in this reference
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ReferenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{:06}", self.0)
    }
}

impl FromStr for ReferenceNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let trimmed = s.trim();
        let (prefix, digits) = trimmed
            .split_at_checked(PREFIX.len())
            .ok_or_else(|| CoreError::invalid_reference(s))?;

        if !prefix.eq_ignore_ascii_case(PREFIX)
            || digits.is_empty()
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(CoreError::invalid_reference(s));
        }

        digits
            .parse()
            .map(Self)
            .map_err(|_| CoreError::invalid_reference(s))
    }
}

impl TryFrom<String> for ReferenceNumber {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        value.parse()
    }
}

impl From<ReferenceNumber> for String {
    fn from(reference: ReferenceNumber) -> Self {
        reference.to_string()
    }
}
