//! Configuration for the `httperr` error factory
//!
//! Settings are read once at process start, usually from a TOML file,
//! and turned into an `ErrorFactory`. Nothing here is mutated afterwards.

#![allow(clippy::must_use_candidate)]

mod loader;
pub mod path_rewrite;

use serde::Deserialize;

pub use path_rewrite::PathRewriteConfig;

/// Default status for errors built without an explicit one (400 Bad Request)
pub const DEFAULT_STATUS: u16 = 400;

/// Default length of generated error ids
pub const DEFAULT_ID_LENGTH: usize = 8;

/// Top-level error factory configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorConfig {
    /// Record the constructing file and line on every new error
    #[serde(default)]
    pub capture_caller: bool,
    /// Status code used by constructors that do not take one
    #[serde(default = "default_status")]
    pub default_status: u16,
    /// Attach a short random id to every new error
    #[serde(default)]
    pub assign_ids: bool,
    /// Number of characters in generated ids
    #[serde(default = "default_id_length")]
    pub id_length: usize,
    /// Rewriting applied to captured file paths
    #[serde(default)]
    pub path_rewrite: Option<PathRewriteConfig>,
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self {
            capture_caller: false,
            default_status: DEFAULT_STATUS,
            assign_ids: false,
            id_length: DEFAULT_ID_LENGTH,
            path_rewrite: None,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_status() -> u16 {
    DEFAULT_STATUS
}

#[allow(clippy::missing_const_for_fn)]
fn default_id_length() -> usize {
    DEFAULT_ID_LENGTH
}
