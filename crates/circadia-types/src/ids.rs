//! Type-safe identifier wrapper for tracked subjects.
//!
//! Subject identifiers come straight from the recorded dataset (for
//! example `"f3"` or `"m11"`), so the wrapper holds the recorded string
//! rather than generating its own. The full set is derived once at load
//! time and never grows.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Unique identifier for one subject under observation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct EntityId(pub String);

impl EntityId {
    /// Wrap a raw identifier string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_bare_string() {
        let id = EntityId::new("f3");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"f3\"");
        let back: EntityId = serde_json::from_str("\"m11\"").unwrap();
        assert_eq!(back.as_str(), "m11");
    }

    #[test]
    fn ordering_follows_string_order() {
        let mut ids = vec![EntityId::from("m2"), EntityId::from("f1"), EntityId::from("f10")];
        ids.sort();
        let raw: Vec<&str> = ids.iter().map(EntityId::as_str).collect();
        assert_eq!(raw, vec!["f1", "f10", "m2"]);
    }
}
