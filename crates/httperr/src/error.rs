use http::StatusCode;
use thiserror::Error;

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by feature-level error enums so they can be turned into an
/// [`ApiError`](crate::ApiError) with [`ApiError::from_http_error`](crate::ApiError::from_http_error)
/// without the domain code knowing about the wire format.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `invalid_request_error`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}

/// Errors raised while configuring the process-wide factory
#[derive(Debug, Error)]
pub enum FactoryError {
    /// A global factory was already installed or has already been used
    #[error("global error factory is already initialized")]
    AlreadyInstalled,
}

/// Boxed error accepted by the wrapping constructors
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
