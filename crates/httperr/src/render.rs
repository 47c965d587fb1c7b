use std::fmt;

use httperr_config::DEFAULT_STATUS;

use crate::value::ApiError;

/// Output form for [`ApiError::render`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verb {
    /// `category=..., code=..., message=...`
    #[default]
    Display,
    /// The message alone, quoted and escaped
    QuotedMessage,
}

impl ApiError {
    /// Render in the requested form
    pub fn render(&self, verb: Verb) -> String {
        match verb {
            Verb::Display => self.to_string(),
            Verb::QuotedMessage => format!("{self:#}"),
        }
    }

    /// JSON form with every zero-valued field omitted
    ///
    /// Never fails: extras are already JSON values.
    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// JSON form as a string
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse the JSON form produced by [`ApiError::to_json`]
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not a JSON object of the expected shape
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    fn write_display(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // hide exactly 400, not the factory default
        if self.status_code != 0 && self.status_code != DEFAULT_STATUS {
            write!(f, "statusCode={}, ", self.status_code)?;
        }
        if !self.file.is_empty() {
            write!(f, "file={},line={}, ", self.file, self.line)?;
        }
        if !self.category.is_empty() {
            write!(f, "category={}, ", self.category)?;
        }
        if !self.code.is_empty() {
            write!(f, "code={}, ", self.code)?;
        }
        write!(f, "message={}", self.message)?;

        if self.has_children() {
            f.write_str(", errs:(")?;
            for (i, child) in self.children().iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                child.write_display(f)?;
            }
            f.write_str(")")?;
        }

        Ok(())
    }
}

/// `{}` renders the display string, `{:#}` the quoted message
///
/// The status is hidden when it is unset or exactly 400, whatever default
/// status the constructing factory used.
impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return write!(f, "{:?}", self.message);
        }
        self.write_display(f)
    }
}
