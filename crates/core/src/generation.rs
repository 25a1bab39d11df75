//! Versioned cache store names.
//!
//! A store is named `{prefix}-{role}-{tag}`. Bumping the tag on deploy creates
//! a fresh store and leaves the previous one to be purged on activation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two store categories the controller owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoreRole {
    Shell,
    Api,
}

impl StoreRole {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreRole::Shell => "shell",
            StoreRole::Api => "api",
        }
    }
}

impl fmt::Display for StoreRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of one store generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheGeneration {
    pub prefix: String,
    pub role: StoreRole,
    pub tag: String,
}

impl CacheGeneration {
    pub fn new(prefix: impl Into<String>, role: StoreRole, tag: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), role, tag: tag.into() }
    }

    /// Store name as persisted, e.g. `story-spa-shell-v3`.
    pub fn store_name(&self) -> String {
        format!("{}-{}-{}", self.prefix, self.role, self.tag)
    }
}

impl fmt::Display for CacheGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.prefix, self.role, self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_name() {
        let shell = CacheGeneration::new("story-spa", StoreRole::Shell, "v3");
        let api = CacheGeneration::new("story-spa", StoreRole::Api, "v2");
        assert_eq!(shell.store_name(), "story-spa-shell-v3");
        assert_eq!(api.store_name(), "story-spa-api-v2");
        assert_eq!(shell.to_string(), shell.store_name());
    }

    #[test]
    fn test_tag_bump_changes_name() {
        let old = CacheGeneration::new("story-spa", StoreRole::Shell, "v2");
        let new = CacheGeneration { tag: "v3".into(), ..old.clone() };
        assert_ne!(old.store_name(), new.store_name());
    }
}
