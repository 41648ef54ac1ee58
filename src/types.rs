use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity of a persisted record, in `table:key` form.
///
/// The table prefix is what the store uses to group records (`list`) and to
/// mint fresh identities (`create`). Keys are opaque.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(table: &str, key: &str) -> Self {
        Self(format!("{table}:{key}"))
    }

    /// Mint a collision-resistant identity in the given table.
    pub fn generate(table: &str) -> Self {
        Self::new(table, &uuid::Uuid::new_v4().simple().to_string())
    }

    /// Table part of the identity; the whole id when there is no separator.
    pub fn table(&self) -> &str {
        self.0.split_once(':').map(|(t, _)| t).unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for RecordId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("record id must not be empty".to_string());
        }
        Ok(Self(s.to_string()))
    }
}

/// One exported environment variable, as returned by an environment resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Boxed, sendable future used at the async trait seams.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;
