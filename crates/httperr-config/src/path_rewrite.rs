use serde::Deserialize;

/// Rewriting of captured source paths
///
/// Keeps call-site provenance stable across build machines by removing
/// checkout-specific prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathRewriteConfig {
    /// Prefixes to strip; the first one that matches wins
    #[serde(default)]
    pub strip_prefixes: Vec<String>,
}

impl PathRewriteConfig {
    /// Apply the configured rewrite to a captured path
    pub fn apply(&self, path: &str) -> String {
        self.strip_prefixes
            .iter()
            .find_map(|prefix| path.strip_prefix(prefix.as_str()))
            .unwrap_or(path)
            .to_owned()
    }
}
