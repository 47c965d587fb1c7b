use std::fmt;
use std::panic::Location;
use std::sync::{Arc, OnceLock};

use http::StatusCode;
use httperr_config::ErrorConfig;

use crate::error::{BoxError, FactoryError, HttpError};
use crate::id;
use crate::location::{CallSite, CallerLocator, Locator};
use crate::shared::SharedApiError;
use crate::value::ApiError;

type PathRewrite = Arc<dyn Fn(&str) -> String + Send + Sync>;

static GLOBAL: OnceLock<ErrorFactory> = OnceLock::new();

/// Builds [`ApiError`] values with a fixed set of construction settings
///
/// Holds the call-site capture switch, the path rewrite applied to captured
/// files, the default status and id generation. Settings never change after
/// construction, so a factory can be shared freely between threads.
///
/// Every constructor is `#[track_caller]`: the recorded call site is the
/// code calling the factory, not the factory itself.
#[derive(Clone)]
pub struct ErrorFactory {
    capture_caller: bool,
    default_status: StatusCode,
    id_length: Option<usize>,
    locator: Arc<dyn Locator>,
    path_rewrite: Option<PathRewrite>,
}

impl fmt::Debug for ErrorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorFactory")
            .field("capture_caller", &self.capture_caller)
            .field("default_status", &self.default_status)
            .field("id_length", &self.id_length)
            .field("path_rewrite", &self.path_rewrite.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for ErrorFactory {
    fn default() -> Self {
        Self::from_validated(&ErrorConfig::default())
    }
}

impl ErrorFactory {
    /// Create a factory with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory from configuration
    ///
    /// The configuration is validated first, so one built in code is held to
    /// the same rules as one read through [`ErrorConfig::load`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation
    pub fn from_config(config: &ErrorConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: &ErrorConfig) -> Self {
        let factory = Self {
            capture_caller: config.capture_caller,
            default_status: StatusCode::from_u16(config.default_status).unwrap_or(StatusCode::BAD_REQUEST),
            id_length: config.assign_ids.then_some(config.id_length),
            locator: Arc::new(CallerLocator),
            path_rewrite: None,
        };

        match config.path_rewrite.clone() {
            Some(rewrite) => factory.with_path_rewrite(move |path| rewrite.apply(path)),
            None => factory,
        }
    }

    /// Enable or disable call-site capture for every constructor
    #[must_use]
    pub fn with_capture_caller(mut self, enabled: bool) -> Self {
        self.capture_caller = enabled;
        self
    }

    /// Status used by constructors that do not take one
    #[must_use]
    pub fn with_default_status(mut self, status: StatusCode) -> Self {
        self.default_status = status;
        self
    }

    /// Attach a random id of `length` characters to every new error
    #[must_use]
    pub fn with_ids(mut self, length: usize) -> Self {
        self.id_length = Some(length);
        self
    }

    /// Replace the call-site locator
    #[must_use]
    pub fn with_locator(mut self, locator: impl Locator + 'static) -> Self {
        self.locator = Arc::new(locator);
        self
    }

    /// Rewrite every captured file path with `rewrite`
    #[must_use]
    pub fn with_path_rewrite<F>(mut self, rewrite: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.path_rewrite = Some(Arc::new(rewrite));
        self
    }

    /// Whether constructors capture the call site
    pub const fn capture_enabled(&self) -> bool {
        self.capture_caller
    }

    /// Status used by constructors that do not take one
    pub const fn default_status(&self) -> StatusCode {
        self.default_status
    }

    /// Process-wide factory used by the crate-level constructors
    ///
    /// Initialized with default settings on first use unless
    /// [`ErrorFactory::install_global`] ran before.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(Self::default)
    }

    /// Install the process-wide factory
    ///
    /// Call once at startup, before any error is constructed through the
    /// crate-level functions.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::AlreadyInstalled`] if a global factory was
    /// installed before or the default one has already been used
    pub fn install_global(factory: Self) -> Result<(), FactoryError> {
        GLOBAL.set(factory).map_err(|_| FactoryError::AlreadyInstalled)?;
        tracing::debug!("installed global error factory");
        Ok(())
    }

    /// Resolve a call site through the locator and path rewrite
    pub fn locate(&self, caller: &'static Location<'static>) -> Option<CallSite> {
        let mut site = self.locator.locate(caller)?;

        if let Some(ref rewrite) = self.path_rewrite {
            site.file = rewrite(&site.file);
        }

        Some(site)
    }

    /// New error with the default status
    #[track_caller]
    pub fn new_error(&self, message: impl Into<String>) -> ApiError {
        self.build(
            ApiError {
                status_code: self.default_status.as_u16(),
                message: message.into(),
                ..ApiError::default()
            },
            false,
        )
    }

    /// New error with the default status and a category
    #[track_caller]
    pub fn new_with_category(&self, message: impl Into<String>, category: impl Into<String>) -> ApiError {
        let mut err = self.new_error(message);
        err.category = category.into();
        err
    }

    /// New error with an explicit status
    #[track_caller]
    pub fn new_with_status_code(&self, message: impl Into<String>, status: StatusCode) -> ApiError {
        let mut err = self.new_error(message);
        err.status_code = status.as_u16();
        err
    }

    /// New error with an explicit status and a category
    #[track_caller]
    pub fn new_with_status_code_and_category(
        &self,
        message: impl Into<String>,
        status: StatusCode,
        category: impl Into<String>,
    ) -> ApiError {
        let mut err = self.new_with_status_code(message, status);
        err.category = category.into();
        err
    }

    /// Wrap an arbitrary error, using its text as the message
    ///
    /// The original error is kept as `cause`. This always builds a new
    /// value; use [`wrap`](crate::wrap) to reuse an existing `ApiError`.
    #[track_caller]
    pub fn new_from_error(&self, cause: impl Into<BoxError>) -> ApiError {
        let cause: BoxError = cause.into();
        let mut err = self.new_error(cause.to_string());
        err.cause = Some(Arc::from(cause));
        err
    }

    /// Wrap an arbitrary error with an explicit status
    #[track_caller]
    pub fn new_from_error_with_status_code(&self, cause: impl Into<BoxError>, status: StatusCode) -> ApiError {
        let mut err = self.new_from_error(cause);
        err.status_code = status.as_u16();
        err
    }

    /// Convert a domain error, keeping its status, error type and client message
    ///
    /// Server errors are marked as exceptions.
    #[track_caller]
    pub fn new_from_http_error<E>(&self, err: E) -> ApiError
    where
        E: HttpError + Send + Sync + 'static,
    {
        let status = err.status_code();
        let mut api = self.new_with_status_code(err.client_message(), status);
        api.code = err.error_type().to_owned();
        api.exception = status.is_server_error();
        api.cause = Some(Arc::new(err));
        api
    }

    /// New error that always records its call site
    #[track_caller]
    pub fn new_with_call_site(&self, message: impl Into<String>) -> ApiError {
        self.build(
            ApiError {
                status_code: self.default_status.as_u16(),
                message: message.into(),
                ..ApiError::default()
            },
            true,
        )
    }

    /// New error marked as an unexpected internal fault
    #[track_caller]
    pub fn new_exception(&self, message: impl Into<String>) -> ApiError {
        let mut err = self.new_error(message);
        err.exception = true;
        err
    }

    /// New lock-guarded error for concurrent writers
    #[track_caller]
    pub fn new_shared(&self, message: impl Into<String>) -> SharedApiError {
        self.new_error(message).into_shared()
    }

    #[track_caller]
    fn build(&self, mut err: ApiError, force_capture: bool) -> ApiError {
        if (self.capture_caller || force_capture)
            && let Some(site) = self.locate(Location::caller())
        {
            err.set_call_site(site);
        }

        if let Some(len) = self.id_length {
            err.id = Some(id::short_id(len));
        }

        err
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use httperr_config::PathRewriteConfig;

    use super::*;

    #[test]
    fn new_error_defaults() {
        let err = ErrorFactory::new().new_error("msg");

        assert_eq!(err.status_code, 400);
        assert_eq!(err.message, "msg");
        assert!(err.file.is_empty());
        assert_eq!(err.line, 0);
        assert!(err.id.is_none());
        assert!(!err.exception);
    }

    #[test]
    fn capture_enabled_records_call_site() {
        let factory = ErrorFactory::new().with_capture_caller(true);
        let err = factory.new_error("msg");

        assert!(err.file.ends_with("factory.rs"));
        assert!(err.line > 0);
    }

    #[test]
    fn call_site_is_the_caller_of_nested_constructors() {
        let factory = ErrorFactory::new().with_capture_caller(true);
        let line = line!() + 1;
        let err = factory.new_with_status_code_and_category("msg", StatusCode::CONFLICT, "orders");

        assert_eq!(err.line, line);
        assert_eq!(err.status_code, 409);
        assert_eq!(err.category, "orders");
    }

    #[test]
    fn new_with_call_site_ignores_capture_switch() {
        let factory = ErrorFactory::new();
        assert!(!factory.capture_enabled());

        let line = line!() + 1;
        let err = factory.new_with_call_site("msg");

        assert!(err.file.ends_with("factory.rs"));
        assert_eq!(err.line, line);
    }

    #[test]
    fn path_rewrite_applies_to_captured_files() {
        let factory = ErrorFactory::new()
            .with_capture_caller(true)
            .with_locator(crate::FixedLocator(CallSite::new("/build/app/src/main.rs", 3)))
            .with_path_rewrite(|path| path.trim_start_matches("/build/app/").to_owned());

        let err = factory.new_error("msg");
        assert_eq!(err.file, "src/main.rs");
        assert_eq!(err.line, 3);
    }

    #[test]
    fn from_config() {
        let config = ErrorConfig {
            capture_caller: true,
            default_status: 422,
            assign_ids: true,
            id_length: 10,
            path_rewrite: Some(PathRewriteConfig {
                strip_prefixes: vec!["/ci/".to_owned()],
            }),
        };

        let factory = ErrorFactory::from_config(&config)
            .unwrap()
            .with_locator(crate::FixedLocator(CallSite::new("/ci/lib.rs", 9)));
        let err = factory.new_error("msg");

        assert_eq!(err.status_code, 422);
        assert_eq!(err.file, "lib.rs");
        assert_eq!(err.id.map(|id| id.len()), Some(10));
    }

    #[test]
    fn from_config_rejects_invalid_status() {
        for status in [42, 700] {
            let config = ErrorConfig {
                default_status: status,
                ..ErrorConfig::default()
            };

            let err = ErrorFactory::from_config(&config).unwrap_err();
            assert!(err.to_string().contains(&status.to_string()), "{err}");
        }
    }

    #[test]
    fn from_config_rejects_zero_id_length() {
        let config = ErrorConfig {
            assign_ids: true,
            id_length: 0,
            ..ErrorConfig::default()
        };

        assert!(ErrorFactory::from_config(&config).is_err());
    }

    #[test]
    fn ids_are_unique_per_error() {
        let factory = ErrorFactory::new().with_ids(12);
        let a = factory.new_error("a");
        let b = factory.new_error("b");

        assert_ne!(a.id, b.id);
    }

    #[test]
    fn new_from_error_keeps_cause() {
        let err = ErrorFactory::new().new_from_error(std::io::Error::other("disk full"));

        assert_eq!(err.message, "disk full");
        assert_eq!(err.status_code, 400);
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("disk full"));
    }

    #[test]
    fn new_from_error_with_status_code() {
        let err = ErrorFactory::new()
            .new_from_error_with_status_code(std::io::Error::other("timeout"), StatusCode::GATEWAY_TIMEOUT);

        assert_eq!(err.status_code, 504);
        assert_eq!(err.message, "timeout");
    }

    #[test]
    fn new_exception_sets_flag() {
        let err = ErrorFactory::new().new_exception("unexpected");
        assert!(err.exception);
        assert_eq!(err.status_code, 400);
    }

    #[test]
    fn new_with_category() {
        let err = ErrorFactory::new()
            .with_default_status(StatusCode::UNPROCESSABLE_ENTITY)
            .new_with_category("bad email", "validation");

        assert_eq!(err.category, "validation");
        assert_eq!(err.status_code, 422);
    }

    #[test]
    fn global_can_only_be_installed_once_used() {
        let _ = ErrorFactory::global();
        assert!(matches!(
            ErrorFactory::install_global(ErrorFactory::new()),
            Err(FactoryError::AlreadyInstalled)
        ));
    }
}
