use std::fmt;
use std::panic::Location;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::aggregate::IntoApiError;
use crate::factory::ErrorFactory;
use crate::location::CallSite;
use crate::value::ApiError;

/// Lock-guarded [`ApiError`] for concurrent writers
///
/// Clones share the same underlying error. Every mutator takes the write
/// lock and every query takes the read lock, so extras and nested errors
/// can be added from several threads without losing updates.
///
/// A plain `ApiError` needs `&mut` access to change, which already rules
/// out unsynchronized concurrent mutation; use this type only when the
/// same error really is written from several places at once.
#[derive(Clone, Default)]
pub struct SharedApiError {
    inner: Arc<RwLock<ApiError>>,
}

impl SharedApiError {
    /// Guard an existing error
    pub fn new(err: ApiError) -> Self {
        Self {
            inner: Arc::new(RwLock::new(err)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ApiError> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ApiError> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or overwrite an extra value
    pub fn add_extra(&self, key: impl Into<String>, value: impl Into<Value>) {
        let (key, value) = (key.into(), value.into());
        self.write().add_extra(key, value);
    }

    /// Insert or overwrite an extra value from any serializable type
    pub fn add_extra_serialize<T>(&self, key: impl Into<String>, value: &T)
    where
        T: Serialize + fmt::Debug + ?Sized,
    {
        let key = key.into();
        self.write().add_extra_serialize(key, value);
    }

    /// Merge errors into the children, see [`ApiError::add`]
    ///
    /// Items are converted before the lock is taken, so a clone of `self`
    /// may appear among them.
    #[track_caller]
    pub fn add<I>(&self, errs: I)
    where
        I: IntoIterator,
        I::Item: IntoApiError,
    {
        let mut converted = Vec::new();
        for err in errs {
            if let Some(err) = err.into_api_error() {
                converted.push(err);
            }
        }

        let mut guard = self.write();
        for err in converted {
            guard.merge(err);
        }
    }

    /// Overwrite the recorded call site
    pub fn set_call_site(&self, site: CallSite) {
        self.write().set_call_site(site);
    }

    /// Record the caller of this method as the call site
    #[track_caller]
    pub fn capture_caller(&self) {
        if let Some(site) = ErrorFactory::global().locate(Location::caller()) {
            self.set_call_site(site);
        }
    }

    /// Whether any nested errors are present
    pub fn has_children(&self) -> bool {
        self.read().has_children()
    }

    /// Whether the nested error list is absent or empty
    pub fn is_empty_children(&self) -> bool {
        self.read().is_empty_children()
    }

    /// Current message
    pub fn message(&self) -> String {
        self.read().message.clone()
    }

    /// Look up an extra value
    pub fn extra_value(&self, key: &str) -> Option<Value> {
        self.read().extra_value(key).cloned()
    }

    /// Detached copy of the current state
    pub fn snapshot(&self) -> ApiError {
        self.read().clone()
    }

    /// Take the error back out, copying it if other clones are still alive
    pub fn into_inner(self) -> ApiError {
        match Arc::try_unwrap(self.inner) {
            Ok(lock) => lock.into_inner().unwrap_or_else(|e| e.into_inner()),
            Err(inner) => Self { inner }.snapshot(),
        }
    }

    /// JSON form of the current state
    pub fn to_json(&self) -> Vec<u8> {
        self.read().to_json()
    }
}

impl ApiError {
    /// Move this error behind a lock for concurrent writers
    pub fn into_shared(self) -> SharedApiError {
        SharedApiError::new(self)
    }
}

impl From<ApiError> for SharedApiError {
    fn from(err: ApiError) -> Self {
        Self::new(err)
    }
}

impl fmt::Display for SharedApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.read(), f)
    }
}

impl fmt::Debug for SharedApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedApiError").field(&*self.read()).finish()
    }
}

impl std::error::Error for SharedApiError {}

impl Serialize for SharedApiError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.read().serialize(serializer)
    }
}
