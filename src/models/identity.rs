//! Authenticated caller identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The principal making a request, as forwarded by the hosting environment.
///
/// Used both as the owner recorded on a report and as the subject of every
/// authorization check. Two identities are the same caller iff their text is equal.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CallerId(String);

impl CallerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CallerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CallerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
