//! Structured API errors
//!
//! [`ApiError`] carries a status code, a machine-readable code, a
//! category, a message, call-site provenance, free-form extras and a flat
//! list of nested errors. Errors are built through an [`ErrorFactory`],
//! either an explicit one or the process-wide default behind the
//! crate-level functions, merged with [`ApiError::add`], and rendered as a
//! display string or as JSON.
//!
//! ```
//! let mut err = httperr::new_with_category("validation failed", "validation");
//! err.add([
//!     httperr::new("email is required"),
//!     httperr::new("email is required"),
//!     httperr::new("name is too long"),
//! ]);
//!
//! assert_eq!(err.children().len(), 2);
//! assert_eq!(
//!     err.to_json_string(),
//!     r#"{"statusCode":400,"category":"validation","message":"validation failed","errs":[{"statusCode":400,"message":"email is required"},{"statusCode":400,"message":"name is too long"}]}"#
//! );
//! ```

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod aggregate;
mod error;
mod factory;
mod id;
mod location;
mod render;
#[cfg(feature = "http")]
mod response;
mod shared;
mod value;

pub use aggregate::{IntoApiError, is_wrapped, wrap, wrap_anyhow, wrap_ref};
pub use error::{BoxError, FactoryError, HttpError};
pub use factory::ErrorFactory;
pub use httperr_config::{ErrorConfig, PathRewriteConfig};
pub use location::{CallSite, CallerLocator, FixedLocator, Locator};
pub use render::Verb;
pub use shared::SharedApiError;
pub use value::{ApiError, Extra};

use http::StatusCode;

/// New error with the default status, built by the global factory
#[track_caller]
pub fn new(message: impl Into<String>) -> ApiError {
    ErrorFactory::global().new_error(message)
}

/// New error with the default status and a category
#[track_caller]
pub fn new_with_category(message: impl Into<String>, category: impl Into<String>) -> ApiError {
    ErrorFactory::global().new_with_category(message, category)
}

/// New error with an explicit status
#[track_caller]
pub fn new_with_status_code(message: impl Into<String>, status: StatusCode) -> ApiError {
    ErrorFactory::global().new_with_status_code(message, status)
}

/// Wrap an arbitrary error, keeping it as `cause`
#[track_caller]
pub fn new_from_error(cause: impl Into<BoxError>) -> ApiError {
    ErrorFactory::global().new_from_error(cause)
}

/// Wrap an arbitrary error with an explicit status
#[track_caller]
pub fn new_from_error_with_status_code(cause: impl Into<BoxError>, status: StatusCode) -> ApiError {
    ErrorFactory::global().new_from_error_with_status_code(cause, status)
}

/// New error that always records its call site
#[track_caller]
pub fn new_with_call_site(message: impl Into<String>) -> ApiError {
    ErrorFactory::global().new_with_call_site(message)
}

/// New error marked as an unexpected internal fault
#[track_caller]
pub fn new_exception(message: impl Into<String>) -> ApiError {
    ErrorFactory::global().new_exception(message)
}

/// New lock-guarded error for concurrent writers
#[track_caller]
pub fn new_shared(message: impl Into<String>) -> SharedApiError {
    ErrorFactory::global().new_shared(message)
}
