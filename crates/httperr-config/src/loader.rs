use std::path::Path;

use crate::ErrorConfig;

/// Largest accepted `id_length`
const MAX_ID_LENGTH: usize = 64;

impl ErrorConfig {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, deserializes it and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, TOML parsing fails,
    /// or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read error config {}: {e}", path.display()))?;

        let config = Self::parse(&raw)?;

        tracing::debug!(
            path = %path.display(),
            capture_caller = config.capture_caller,
            default_status = config.default_status,
            "loaded error config"
        );

        Ok(config)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if TOML parsing or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse error config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the default status is not a usable HTTP status,
    /// the id length is out of range, or a strip prefix is empty
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_default_status()?;
        self.validate_ids()?;
        self.validate_path_rewrite()?;
        Ok(())
    }

    fn validate_default_status(&self) -> anyhow::Result<()> {
        let status = http::StatusCode::from_u16(self.default_status)
            .map_err(|e| anyhow::anyhow!("default_status {} is not a valid status code: {e}", self.default_status))?;

        // from_u16 accepts 100..=999
        if status.as_u16() > 599 {
            anyhow::bail!("default_status must be between 100 and 599, got {}", self.default_status);
        }

        Ok(())
    }

    fn validate_ids(&self) -> anyhow::Result<()> {
        if self.id_length == 0 || self.id_length > MAX_ID_LENGTH {
            anyhow::bail!("id_length must be between 1 and {MAX_ID_LENGTH}, got {}", self.id_length);
        }

        Ok(())
    }

    fn validate_path_rewrite(&self) -> anyhow::Result<()> {
        let Some(ref rewrite) = self.path_rewrite else {
            return Ok(());
        };

        if rewrite.strip_prefixes.iter().any(String::is_empty) {
            anyhow::bail!("path_rewrite.strip_prefixes must not contain empty strings");
        }

        Ok(())
    }
}
