/// ID types for BetNad entities
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity-provider subject id.
///
/// The join key between the provider's user record and the persisted `User`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    /// Create a new subject ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
