//! Merging of nested errors
//!
//! [`ApiError::add`] folds any number of errors into a flat, ordered,
//! duplicate-free list of leaf errors. An argument that already carries
//! nested errors is never nested itself; its children are merged in its
//! place, recursively. A leaf is dropped when an earlier entry has the
//! same title, message and category.

use std::any::Any;

use crate::error::BoxError;
use crate::factory::ErrorFactory;
use crate::shared::SharedApiError;
use crate::value::ApiError;

/// Conversion into an [`ApiError`] for [`ApiError::add`]
///
/// `None` converts to nothing, so optional errors can be passed as is.
pub trait IntoApiError {
    /// Convert, returning `None` when there is no error to add
    fn into_api_error(self) -> Option<ApiError>;
}

impl IntoApiError for ApiError {
    fn into_api_error(self) -> Option<ApiError> {
        Some(self)
    }
}

impl IntoApiError for &ApiError {
    fn into_api_error(self) -> Option<ApiError> {
        Some(self.clone())
    }
}

impl IntoApiError for SharedApiError {
    fn into_api_error(self) -> Option<ApiError> {
        Some(self.into_inner())
    }
}

impl IntoApiError for &SharedApiError {
    fn into_api_error(self) -> Option<ApiError> {
        Some(self.snapshot())
    }
}

impl IntoApiError for BoxError {
    #[track_caller]
    fn into_api_error(self) -> Option<ApiError> {
        Some(wrap_boxed(self))
    }
}

impl IntoApiError for anyhow::Error {
    #[track_caller]
    fn into_api_error(self) -> Option<ApiError> {
        Some(wrap_anyhow(self))
    }
}

impl<T: IntoApiError> IntoApiError for Option<T> {
    #[track_caller]
    fn into_api_error(self) -> Option<ApiError> {
        match self {
            Some(err) => err.into_api_error(),
            None => None,
        }
    }
}

/// Whether `err` is an [`ApiError`] or a [`SharedApiError`]
pub fn is_wrapped(err: &(dyn std::error::Error + 'static)) -> bool {
    err.is::<ApiError>() || err.is::<SharedApiError>()
}

/// Coerce any error into an owned [`ApiError`]
///
/// An `ApiError` is returned as is, a `SharedApiError` is snapshotted, and
/// anything else is wrapped through the global factory with the original
/// kept as `cause`. An `anyhow::Error` goes through [`wrap_anyhow`] so one
/// of our errors inside it is recovered instead of wrapped again. The
/// result never shares state with another value.
#[track_caller]
pub fn wrap<E>(err: E) -> ApiError
where
    E: Into<BoxError> + 'static,
{
    let mut slot = Some(err);

    // anyhow's boxed form hides the concrete type, so look for it first
    if let Some(err) = (&mut slot as &mut dyn Any)
        .downcast_mut::<Option<anyhow::Error>>()
        .and_then(Option::take)
    {
        return wrap_anyhow(err);
    }

    match slot {
        Some(err) => wrap_boxed(err.into()),
        None => ApiError::default(),
    }
}

/// Coerce an `anyhow::Error` into an owned [`ApiError`]
///
/// Recovers an `ApiError` or `SharedApiError` carried by the anyhow error,
/// otherwise wraps it with the top-level message as `message`.
#[track_caller]
pub fn wrap_anyhow(err: anyhow::Error) -> ApiError {
    let err = match err.downcast::<ApiError>() {
        Ok(api) => return api,
        Err(other) => other,
    };

    match err.downcast::<SharedApiError>() {
        Ok(shared) => shared.into_inner(),
        Err(other) => ErrorFactory::global().new_from_error(other),
    }
}

#[track_caller]
fn wrap_boxed(err: BoxError) -> ApiError {
    let err = match err.downcast::<ApiError>() {
        Ok(api) => return *api,
        Err(other) => other,
    };

    match err.downcast::<SharedApiError>() {
        Ok(shared) => (*shared).into_inner(),
        Err(other) => ErrorFactory::global().new_from_error(other),
    }
}

/// Coerce a borrowed error into an [`ApiError`]
///
/// Clones when `err` already is one; otherwise builds a new error from its
/// text. The cause cannot be retained from a borrow.
#[track_caller]
pub fn wrap_ref(err: &(dyn std::error::Error + 'static)) -> ApiError {
    if let Some(api) = err.downcast_ref::<ApiError>() {
        return api.clone();
    }

    if let Some(shared) = err.downcast_ref::<SharedApiError>() {
        return shared.snapshot();
    }

    ErrorFactory::global().new_error(err.to_string())
}

impl ApiError {
    /// Merge errors into this error's children
    ///
    /// `None` items are skipped. Aggregates are flattened into their leaf
    /// errors and duplicates (same title, message and category as an
    /// existing child) are dropped, keeping the first occurrence.
    #[track_caller]
    pub fn add<I>(&mut self, errs: I)
    where
        I: IntoIterator,
        I::Item: IntoApiError,
    {
        for err in errs {
            if let Some(err) = err.into_api_error() {
                self.merge(err);
            }
        }
    }

    pub(crate) fn merge(&mut self, mut err: Self) {
        match err.children.take() {
            Some(children) if !children.is_empty() => {
                for child in children {
                    self.merge(child);
                }
            }
            children => {
                err.children = children;
                self.push_unique(err);
            }
        }
    }

    fn push_unique(&mut self, err: Self) {
        let children = self.children.get_or_insert_with(Vec::new);

        if children.iter().any(|existing| existing.same_entry(&err)) {
            tracing::trace!(
                title = %err.title,
                category = %err.category,
                "dropping duplicate nested error: {}",
                err.message
            );
            return;
        }

        children.push(err);
    }

    fn same_entry(&self, other: &Self) -> bool {
        self.title == other.title && self.message == other.message && self.category == other.category
    }
}
