//! Configuration management

use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// Path to the order CSV loaded at startup
    pub path: String,
}

/// How the dashboard renders money. The dataset itself is unit-less; these
/// only affect formatting.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_locale() -> String {
    "es-CO".to_string()
}

const SUPPORTED_CURRENCIES: &[&str] = &["USD", "EUR", "BRL"];
const SUPPORTED_LOCALES: &[&str] = &["en-US", "es-CO", "pt-BR"];

impl DisplayConfig {
    pub fn symbol(&self) -> &'static str {
        match self.currency.as_str() {
            "USD" => "US$",
            "EUR" => "\u{20ac}",
            "BRL" => "R$",
            _ => "$",
        }
    }

    /// (thousands separator, decimal separator) for the configured locale
    pub fn separators(&self) -> (char, char) {
        match self.locale.as_str() {
            "en-US" => (',', '.'),
            // es-CO and pt-BR both group with '.' and use ',' for decimals
            _ => ('.', ','),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";

        let builder = config::Config::builder()
            .add_source(config::File::with_name(config_path))
            .add_source(config::Environment::with_prefix("ORDERSCOPE"));

        let settings = builder.build()?;
        let config: Config = settings.try_deserialize()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate server config
        if self.server.http_port == 0 {
            anyhow::bail!("Invalid http_port: 0 is not allowed");
        }
        if self.server.host.is_empty() {
            anyhow::bail!("Server host cannot be empty");
        }

        // Validate dataset config
        if self.dataset.path.is_empty() {
            anyhow::bail!("Dataset path cannot be empty");
        }

        // Validate display config
        if !SUPPORTED_CURRENCIES.contains(&self.display.currency.as_str()) {
            anyhow::bail!(
                "Unsupported currency '{}'. Must be one of: {:?}",
                self.display.currency,
                SUPPORTED_CURRENCIES
            );
        }
        if !SUPPORTED_LOCALES.contains(&self.display.locale.as_str()) {
            anyhow::bail!(
                "Unsupported locale '{}'. Must be one of: {:?}",
                self.display.locale,
                SUPPORTED_LOCALES
            );
        }

        // Validate logging level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid logging level '{}'. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        Ok(())
    }
}
