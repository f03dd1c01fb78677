//! Lookup service configuration.

use std::collections::HashSet;

use crate::shard::PlaceKind;

/// Configuration for a [`super::LookupService`].
///
/// # Example
///
/// ```
/// use placetrie::service::LookupConfig;
///
/// let config = LookupConfig::default()
///     .with_shard_root("https://tiles.example/geocode")
///     .with_max_results(20);
/// assert_eq!(config.max_results(), 20);
/// ```
#[derive(Debug, Clone)]
pub struct LookupConfig {
    max_results: usize,
    shard_prefix_len: usize,
    shard_root: String,
    shard_base: String,
    shard_suffix: String,
    allowed_kinds: Option<HashSet<PlaceKind>>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            max_results: 80,
            shard_prefix_len: 3,
            shard_root: String::new(),
            shard_base: "street_trie".into(),
            shard_suffix: ".packed.gz".into(),
            allowed_kinds: None,
        }
    }
}

impl LookupConfig {
    /// Cap on the number of candidates a lookup returns.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Number of folded characters that select a shard.
    pub fn with_shard_prefix_len(mut self, shard_prefix_len: usize) -> Self {
        self.shard_prefix_len = shard_prefix_len;
        self
    }

    /// Base URL or directory the shard files live under.
    pub fn with_shard_root(mut self, shard_root: impl Into<String>) -> Self {
        self.shard_root = shard_root.into();
        self
    }

    /// File name stem of the shard set.
    pub fn with_shard_base(mut self, shard_base: impl Into<String>) -> Self {
        self.shard_base = shard_base.into();
        self
    }

    /// File name suffix of the shard set, extension included.
    pub fn with_shard_suffix(mut self, shard_suffix: impl Into<String>) -> Self {
        self.shard_suffix = shard_suffix.into();
        self
    }

    /// Restrict results to these kinds. `None` allows everything.
    pub fn with_allowed_kinds(mut self, kinds: Option<impl IntoIterator<Item = PlaceKind>>) -> Self {
        self.allowed_kinds = kinds.map(|k| k.into_iter().collect());
        self
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn shard_prefix_len(&self) -> usize {
        self.shard_prefix_len
    }

    pub fn shard_root(&self) -> &str {
        &self.shard_root
    }

    pub fn shard_base(&self) -> &str {
        &self.shard_base
    }

    pub fn shard_suffix(&self) -> &str {
        &self.shard_suffix
    }

    pub fn allowed_kinds(&self) -> Option<&HashSet<PlaceKind>> {
        self.allowed_kinds.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LookupConfig::default();
        assert_eq!(config.max_results(), 80);
        assert_eq!(config.shard_prefix_len(), 3);
        assert_eq!(config.shard_base(), "street_trie");
        assert_eq!(config.shard_suffix(), ".packed.gz");
        assert!(config.shard_root().is_empty());
        assert!(config.allowed_kinds().is_none());
    }

    #[test]
    fn test_builder_chain() {
        let config = LookupConfig::default()
            .with_max_results(10)
            .with_shard_prefix_len(4)
            .with_shard_root("build/shards")
            .with_shard_base("poi_trie")
            .with_shard_suffix(".packed")
            .with_allowed_kinds(Some([PlaceKind::City, PlaceKind::Street]));
        assert_eq!(config.max_results(), 10);
        assert_eq!(config.shard_prefix_len(), 4);
        assert_eq!(config.shard_root(), "build/shards");
        assert_eq!(config.shard_base(), "poi_trie");
        assert_eq!(config.shard_suffix(), ".packed");
        assert_eq!(config.allowed_kinds().unwrap().len(), 2);
    }
}
