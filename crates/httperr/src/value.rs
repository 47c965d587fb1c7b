use std::collections::BTreeMap;
use std::fmt::Debug;
use std::panic::Location;
use std::sync::Arc;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HttpError;
use crate::factory::ErrorFactory;
use crate::id;
use crate::location::CallSite;

/// Free-form diagnostic context attached to an error
///
/// Ordered by key so the serialized form is deterministic.
pub type Extra = BTreeMap<String, Value>;

/// Structured API error
///
/// Carries everything needed to describe a failure to an API consumer:
/// status, machine-readable code, classification, message, call-site
/// provenance, extras and any nested errors collected with [`ApiError::add`].
///
/// Every zero-valued field is left out of the JSON form. `cause` is never
/// serialized; it is only reachable through [`std::error::Error::source`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Short correlation id
    #[serde(default, skip_serializing_if = "is_blank_id")]
    pub id: Option<String>,
    /// HTTP status; 0 means unset
    #[serde(default, skip_serializing_if = "is_zero_status")]
    pub status_code: u16,
    /// Machine-readable error code
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    /// Coarse classification
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    /// Fine classification
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sub_category: String,
    /// Short label, distinct from the message
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Unexpected internal fault rather than an expected domain error
    #[serde(default, skip_serializing_if = "is_false")]
    pub exception: bool,
    /// Underlying error this value wraps
    #[serde(skip)]
    pub cause: Option<Arc<dyn std::error::Error + Send + Sync>>,
    /// Source file the error was constructed in
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
    /// Source line the error was constructed on
    #[serde(default, skip_serializing_if = "is_zero_line")]
    pub line: u32,
    /// Diagnostic key/value context
    #[serde(default, skip_serializing_if = "is_empty_extra")]
    pub extra: Option<Extra>,
    /// Nested errors
    #[serde(default, rename = "errs", skip_serializing_if = "is_empty_children")]
    pub children: Option<Vec<ApiError>>,
}

impl ApiError {
    /// Set the status code
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status_code = status.as_u16();
        self
    }

    /// Set the machine-readable code
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Set the category
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the sub-category
    #[must_use]
    pub fn with_sub_category(mut self, sub_category: impl Into<String>) -> Self {
        self.sub_category = sub_category.into();
        self
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Mark the error as an unexpected internal fault
    #[must_use]
    pub fn with_exception(mut self, exception: bool) -> Self {
        self.exception = exception;
        self
    }

    /// Set the correlation id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach a freshly generated short id
    #[must_use]
    pub fn with_generated_id(mut self) -> Self {
        self.id = Some(id::short_id(httperr_config::DEFAULT_ID_LENGTH));
        self
    }

    /// Attach an extra value
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add_extra(key, value);
        self
    }

    /// Record the call site
    #[must_use]
    pub fn with_call_site(mut self, site: CallSite) -> Self {
        self.set_call_site(site);
        self
    }

    /// Parsed status code, `None` when unset or out of range
    pub fn status(&self) -> Option<StatusCode> {
        if self.status_code == 0 {
            return None;
        }
        StatusCode::from_u16(self.status_code).ok()
    }

    /// Status to answer with at an HTTP boundary
    ///
    /// Falls back to 500 for exceptions and 400 otherwise when no valid
    /// status is set.
    pub fn response_status(&self) -> StatusCode {
        self.status().unwrap_or(if self.exception {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_REQUEST
        })
    }

    /// Insert or overwrite an extra value
    pub fn add_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.get_or_insert_with(Extra::new).insert(key.into(), value.into());
    }

    /// Insert or overwrite an extra value from any serializable type
    ///
    /// Values serde cannot represent are stored as their `Debug` text.
    pub fn add_extra_serialize<T>(&mut self, key: impl Into<String>, value: &T)
    where
        T: Serialize + Debug + ?Sized,
    {
        let key = key.into();
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            tracing::debug!(key = %key, error = %e, "extra value not serializable, storing debug text");
            Value::String(format!("{value:?}"))
        });
        self.add_extra(key, value);
    }

    /// Look up an extra value
    pub fn extra_value(&self, key: &str) -> Option<&Value> {
        self.extra.as_ref()?.get(key)
    }

    /// Recorded call site, if any
    pub fn call_site(&self) -> Option<CallSite> {
        if self.file.is_empty() {
            return None;
        }
        Some(CallSite::new(self.file.clone(), self.line))
    }

    /// Overwrite the recorded call site
    pub fn set_call_site(&mut self, site: CallSite) {
        self.file = site.file;
        self.line = site.line;
    }

    /// Record the caller of this method as the call site
    ///
    /// Uses the locator and path rewrite of the global factory.
    #[track_caller]
    pub fn capture_caller(&mut self) {
        if let Some(site) = ErrorFactory::global().locate(Location::caller()) {
            self.set_call_site(site);
        }
    }

    /// Nested errors, empty when none were added
    pub fn children(&self) -> &[Self] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Whether any nested errors are present
    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Whether the nested error list is absent or empty
    pub fn is_empty_children(&self) -> bool {
        self.children().is_empty()
    }

    /// Clone with a different message
    ///
    /// The clone keeps the id, cause and every other field. Extras and
    /// nested errors are copied, so mutating the clone leaves `self` as is.
    #[must_use]
    pub fn clone_with_message(&self, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..self.clone()
        }
    }

    /// Convert a domain error into an `ApiError` using the global factory
    #[track_caller]
    pub fn from_http_error<E>(err: E) -> Self
    where
        E: HttpError + Send + Sync + 'static,
    {
        ErrorFactory::global().new_from_http_error(err)
    }

    /// Emit this error as a single structured `tracing` event
    ///
    /// Exceptions and 5xx errors are logged at `error`, everything else at `warn`.
    pub fn log(&self) {
        let children = self.children().len();

        if self.exception || self.status().is_some_and(|s| s.is_server_error()) {
            tracing::error!(
                status = self.status_code,
                code = %self.code,
                category = %self.category,
                file = %self.file,
                line = self.line,
                children,
                "{}",
                self.message
            );
        } else {
            tracing::warn!(
                status = self.status_code,
                code = %self.code,
                category = %self.category,
                file = %self.file,
                line = self.line,
                children,
                "{}",
                self.message
            );
        }
    }
}

impl PartialEq for ApiError {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.status_code == other.status_code
            && self.code == other.code
            && self.category == other.category
            && self.sub_category == other.sub_category
            && self.title == other.title
            && self.message == other.message
            && self.exception == other.exception
            && self.file == other.file
            && self.line == other.line
            && self.extra == other.extra
            && self.children == other.children
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl HttpError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.response_status()
    }

    fn error_type(&self) -> &str {
        if !self.code.is_empty() {
            &self.code
        } else if !self.category.is_empty() {
            &self.category
        } else {
            "error"
        }
    }

    fn client_message(&self) -> String {
        self.message.clone()
    }
}

fn is_blank_id(id: &Option<String>) -> bool {
    id.as_deref().is_none_or(str::is_empty)
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero_status(status: &u16) -> bool {
    *status == 0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero_line(line: &u32) -> bool {
    *line == 0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

fn is_empty_extra(extra: &Option<Extra>) -> bool {
    extra.as_ref().is_none_or(BTreeMap::is_empty)
}

fn is_empty_children(children: &Option<Vec<ApiError>>) -> bool {
    children.as_ref().is_none_or(Vec::is_empty)
}
