use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a placeholder cannot be
    /// expanded, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the model is unnamed, routes collide or are
    /// malformed, or engine or telemetry settings are unusable
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_model()?;
        self.validate_routes()?;
        self.validate_engine()?;
        self.validate_telemetry()?;
        Ok(())
    }

    fn validate_model(&self) -> anyhow::Result<()> {
        if self.model.name.trim().is_empty() {
            anyhow::bail!("model.name must not be empty");
        }

        Ok(())
    }

    fn validate_routes(&self) -> anyhow::Result<()> {
        let worker = &self.server.worker;

        if !worker.path.starts_with('/') {
            anyhow::bail!("server.worker.path must start with '/': {}", worker.path);
        }

        if worker.body_limit == 0 {
            anyhow::bail!("server.worker.body_limit must be greater than 0");
        }

        let health = &self.server.health;

        if health.enabled {
            if !health.path.starts_with('/') {
                anyhow::bail!("server.health.path must start with '/': {}", health.path);
            }

            if health.path == worker.path {
                anyhow::bail!("server.health.path and server.worker.path must differ: {}", worker.path);
            }
        }

        Ok(())
    }

    fn validate_engine(&self) -> anyhow::Result<()> {
        let scheme = self.engine.base_url.scheme();
        if scheme != "http" && scheme != "https" {
            anyhow::bail!("engine.base_url must use http or https, got '{scheme}'");
        }

        self.engine.timeout()?;

        Ok(())
    }

    fn validate_telemetry(&self) -> anyhow::Result<()> {
        let Some(ref telemetry) = self.telemetry else {
            return Ok(());
        };

        let rate = telemetry.sampling_rate();
        if !(0.0..=1.0).contains(&rate) {
            anyhow::bail!("telemetry.tracing.sampling_rate must be between 0.0 and 1.0, got {rate}");
        }

        telemetry.metrics_interval()?;

        Ok(())
    }
}
