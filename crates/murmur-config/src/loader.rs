use std::path::Path;

use http::{HeaderName, Method, Uri};

use crate::{AnyOrList, Config};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the model chain, timeout, artifact bound, CORS
    /// lists or language list is unusable
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_model_config()?;
        self.validate_artifact_config()?;
        self.validate_cors_config()?;

        if self.tts.supported_languages.is_empty() {
            anyhow::bail!("tts.supported_languages must list at least one language");
        }

        if !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        Ok(())
    }

    fn validate_model_config(&self) -> anyhow::Result<()> {
        let Some(ref model) = self.tts.model else {
            return Ok(());
        };

        if model.models.is_empty() {
            anyhow::bail!("tts.model.models must list at least one voice model");
        }

        if let Some(ref timeout) = model.timeout {
            let duration = duration_str::parse(timeout)
                .map_err(|e| anyhow::anyhow!("invalid tts.model.timeout '{timeout}': {e}"))?;

            if duration.is_zero() {
                anyhow::bail!("tts.model.timeout must be greater than zero");
            }
        }

        Ok(())
    }

    fn validate_artifact_config(&self) -> anyhow::Result<()> {
        if self.tts.artifacts.max_files == Some(0) {
            anyhow::bail!("tts.artifacts.max_files must be greater than 0");
        }

        Ok(())
    }

    fn validate_cors_config(&self) -> anyhow::Result<()> {
        let cors = &self.server.cors;

        if let AnyOrList::List(ref origins) = cors.origins {
            for origin in origins {
                let valid = origin.parse::<Uri>().is_ok_and(|uri| {
                    uri.scheme().is_some()
                        && uri.authority().is_some()
                        && matches!(uri.path(), "" | "/")
                        && uri.query().is_none()
                });

                if !valid {
                    anyhow::bail!("server.cors.origins: '{origin}' is not an origin like 'https://example.com'");
                }
            }
        }

        if let AnyOrList::List(ref methods) = cors.methods {
            for method in methods {
                method
                    .parse::<Method>()
                    .map_err(|e| anyhow::anyhow!("server.cors.methods: '{method}': {e}"))?;
            }
        }

        if let AnyOrList::List(ref headers) = cors.headers {
            for header in headers {
                header
                    .parse::<HeaderName>()
                    .map_err(|e| anyhow::anyhow!("server.cors.headers: '{header}': {e}"))?;
            }
        }

        Ok(())
    }
}
