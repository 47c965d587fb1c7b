use std::fmt;
use std::panic::Location;

/// Source position an error was constructed at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    /// Source file path, after any configured rewrite
    pub file: String,
    /// 1-based line number
    pub line: u32,
}

impl CallSite {
    /// Create a call site from an explicit file and line
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl From<&Location<'_>> for CallSite {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Resolves the call site recorded on new errors
///
/// Construction entry points are `#[track_caller]`, so `caller` is the
/// application code that asked for the error.
pub trait Locator: Send + Sync {
    /// Call site to record, or `None` to record nothing
    fn locate(&self, caller: &'static Location<'static>) -> Option<CallSite>;
}

/// Records the location reported by `#[track_caller]`
#[derive(Debug, Default, Clone, Copy)]
pub struct CallerLocator;

impl Locator for CallerLocator {
    fn locate(&self, caller: &'static Location<'static>) -> Option<CallSite> {
        Some(CallSite::from(caller))
    }
}

/// Always reports the same call site
#[derive(Debug, Clone)]
pub struct FixedLocator(pub CallSite);

impl Locator for FixedLocator {
    fn locate(&self, _caller: &'static Location<'static>) -> Option<CallSite> {
        Some(self.0.clone())
    }
}
