// Generator configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Generated methods take and return pointer receivers
    #[serde(default)]
    pub pointer_receiver: bool,

    /// Name of the generated method, also searched for when reusing
    /// existing copy operations
    #[serde(default = "default_method_name")]
    pub method_name: String,

    /// Recursion cutoff per target type (0 = unbounded)
    #[serde(default)]
    pub max_depth: usize,

    /// Skip sets, positionally aligned with the target list
    #[serde(default)]
    pub skip_lists: SkipLists,
}

fn default_method_name() -> String {
    "DeepCopy".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pointer_receiver: false,
            method_name: default_method_name(),
            max_depth: 0,
            skip_lists: SkipLists::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }
}

/// One skip set per requested target type, in request order. Positions
/// past the end behave as empty sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkipLists(pub Vec<SkipSet>);

impl SkipLists {
    pub fn get(&self, i: usize) -> SkipSet {
        self.0.get(i).cloned().unwrap_or_default()
    }
}

/// Root-relative paths excluded from deep recursion. Matching is exact:
/// struct fields as `A.B`, slice elements as `A[i]`, map keys and values
/// as `A[k]` and `A[v]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkipSet(pub BTreeSet<String>);

impl SkipSet {
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(paths.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, sel: &str) -> bool {
        self.0.contains(sel)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(!config.pointer_receiver);
        assert_eq!(config.method_name, "DeepCopy");
        assert_eq!(config.max_depth, 0);
    }

    #[test]
    fn skip_lists_past_the_end_are_empty() {
        let lists = SkipLists(vec![SkipSet::from_paths(["Tags[i]"])]);
        assert!(lists.get(0).contains("Tags[i]"));
        assert!(lists.get(5).is_empty());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config {
            pointer_receiver: true,
            method_name: "Clone".to_string(),
            max_depth: 4,
            skip_lists: SkipLists(vec![SkipSet::from_paths(["A.B", "C[k]"])]),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.method_name, "Clone");
        assert_eq!(back.max_depth, 4);
        assert!(back.skip_lists.get(0).contains("C[k]"));
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "pointer_receiver": true }"#).unwrap();
        assert!(config.pointer_receiver);
        assert_eq!(config.method_name, "DeepCopy");
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dcgen.json");
        std::fs::write(&path, r#"{ "method_name": "Copy" }"#).unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.method_name, "Copy");
    }
}
