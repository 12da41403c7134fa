//! Configuration management for the fridge CLI

use config::{Config as Layered, Environment};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{FridgeError, Result};
use crate::ui::UI;
use crate::ConfigCommand;

pub const DEFAULT_CHAT_ENDPOINT: &str = "http://pc.local:11434/api/chat";
pub const DEFAULT_SENSOR_ENDPOINT: &str = "https://vabre.ch/crios";
pub const DEFAULT_TEXT_MODEL: &str = "llama3.1:latest";
pub const DEFAULT_VISION_MODEL: &str = "llama3.2-vision";
pub const DEFAULT_TIMEOUT: u64 = 120;

const ENV_PREFIX: &str = "FRIDGE";

/// User settings persisted as JSON in the config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chat_endpoint: String,
    pub sensor_endpoint: String,
    pub text_model: String,
    pub vision_model: String,
    pub timeout: u64,
    pub verbose: bool,
    pub storage_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chat_endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            sensor_endpoint: DEFAULT_SENSOR_ENDPOINT.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            verbose: false,
            storage_dir: default_storage_dir(),
        }
    }
}

impl Config {
    /// Load from the default location
    pub async fn load() -> Result<Self> {
        Self::load_from(&default_config_path()).await
    }

    /// Load from `config_file`, writing defaults when it is missing or unreadable
    pub async fn load_from(config_file: &Path) -> Result<Self> {
        if config_file.exists() {
            let content = fs::read_to_string(config_file).await?;

            match serde_json::from_str::<Self>(&content) {
                Ok(config) => Ok(config),
                Err(e) => {
                    warn!(path = %config_file.display(), error = %e, "config file unreadable, resetting to defaults");
                    let config = Self::default();
                    config.save(config_file).await?;
                    Ok(config)
                }
            }
        } else {
            debug!(path = %config_file.display(), "creating default config");
            let config = Self::default();
            config.save(config_file).await?;
            Ok(config)
        }
    }

    pub async fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content).await?;
        Ok(())
    }

    /// Path of the persisted food inventory
    pub fn inventory_path(&self) -> PathBuf {
        self.storage_dir.join("inventory.json")
    }

    /// Build the runtime client configuration, layering environment
    /// overrides on top of these settings
    pub fn to_client_config(&self) -> Result<ClientConfig> {
        self.client_builder().build()
    }

    /// Check the persisted values alone, without environment overrides
    pub fn validate(&self) -> Result<()> {
        self.client_builder().ignore_env().build().map(|_| ())
    }

    fn client_builder(&self) -> ClientConfigBuilder {
        ClientConfig::builder()
            .chat_endpoint(&self.chat_endpoint)
            .sensor_endpoint(&self.sensor_endpoint)
            .text_model(&self.text_model)
            .vision_model(&self.vision_model)
            .timeout(self.timeout)
    }
}

pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fridge-assistant")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

pub fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fridge-assistant")
}

/// Runtime configuration for the HTTP clients
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    pub chat_endpoint: String,
    pub sensor_endpoint: String,
    pub text_model: String,
    pub vision_model: String,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_use_proxy")]
    pub use_proxy: bool,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT
}

fn default_use_proxy() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chat_endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            sensor_endpoint: DEFAULT_SENSOR_ENDPOINT.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            timeout: default_timeout(),
            use_proxy: default_use_proxy(),
        }
    }
}

/// Builder for ClientConfig
///
/// Explicit values are defaults; `FRIDGE_*` environment variables are
/// layered on top of them.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    chat_endpoint: Option<String>,
    sensor_endpoint: Option<String>,
    text_model: Option<String>,
    vision_model: Option<String>,
    timeout: Option<u64>,
    read_env: bool,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            read_env: true,
            ..Self::default()
        }
    }

    pub fn chat_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.chat_endpoint = Some(endpoint.into());
        self
    }

    pub fn sensor_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.sensor_endpoint = Some(endpoint.into());
        self
    }

    pub fn text_model<S: Into<String>>(mut self, model: S) -> Self {
        self.text_model = Some(model.into());
        self
    }

    pub fn vision_model<S: Into<String>>(mut self, model: S) -> Self {
        self.vision_model = Some(model.into());
        self
    }

    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Skip `FRIDGE_*` environment variables
    pub fn ignore_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    pub fn build(self) -> Result<ClientConfig> {
        let defaults = ClientConfig::default();

        let mut builder = Layered::builder()
            .set_default(
                "chat_endpoint",
                self.chat_endpoint.unwrap_or(defaults.chat_endpoint),
            )?
            .set_default(
                "sensor_endpoint",
                self.sensor_endpoint.unwrap_or(defaults.sensor_endpoint),
            )?
            .set_default("text_model", self.text_model.unwrap_or(defaults.text_model))?
            .set_default(
                "vision_model",
                self.vision_model.unwrap_or(defaults.vision_model),
            )?
            .set_default("timeout", self.timeout.unwrap_or(defaults.timeout) as i64)?
            .set_default("use_proxy", defaults.use_proxy)?;

        if self.read_env {
            builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));
        }

        let config: ClientConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if self.chat_endpoint.trim().is_empty() {
            return Err(FridgeError::invalid_endpoint("Chat endpoint cannot be empty"));
        }
        if self.sensor_endpoint.trim().is_empty() {
            return Err(FridgeError::invalid_endpoint("Sensor endpoint cannot be empty"));
        }
        if self.text_model.trim().is_empty() || self.vision_model.trim().is_empty() {
            return Err(FridgeError::validation_field("Model name cannot be empty", "model"));
        }
        if self.timeout == 0 {
            return Err(FridgeError::validation_field("Timeout must be positive", "timeout"));
        }
        reqwest::Url::parse(&self.chat_url()).map_err(|e| {
            FridgeError::invalid_endpoint(format!("Invalid chat endpoint '{}': {}", self.chat_endpoint, e))
        })?;
        reqwest::Url::parse(&self.sensor_url("")).map_err(|e| {
            FridgeError::invalid_endpoint(format!(
                "Invalid sensor endpoint '{}': {}",
                self.sensor_endpoint, e
            ))
        })?;
        Ok(())
    }

    /// Full URL of the chat endpoint; a bare host defaults to plain HTTP
    pub fn chat_url(&self) -> String {
        with_scheme(&self.chat_endpoint, "http")
    }

    /// URL of a resource under the sensor base; a bare host defaults to HTTPS
    pub fn sensor_url(&self, resource: &str) -> String {
        let resource = resource.strip_prefix('/').unwrap_or(resource);
        let base = with_scheme(&self.sensor_endpoint, "https");
        format!("{}/{}", base.trim_end_matches('/'), resource)
    }
}

fn with_scheme(endpoint: &str, scheme: &str) -> String {
    let endpoint = endpoint.trim();
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("{}://{}", scheme, endpoint)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(FridgeError::invalid_input(format!(
            "Expected true/false, got '{}'",
            other
        ))),
    }
}

/// Handles `fridge config ...`
pub struct ConfigService {
    config: Config,
    config_path: PathBuf,
    ui: UI,
}

impl ConfigService {
    pub fn with_config_path(config: Config, config_path: PathBuf) -> Self {
        Self {
            config,
            config_path,
            ui: UI::new(),
        }
    }

    pub async fn handle_config(&mut self, command: ConfigCommand) -> Result<()> {
        match command {
            ConfigCommand::Show => {
                self.show();
                return Ok(());
            }
            ConfigCommand::Reset => {
                self.config = Config::default();
            }
            other => self.apply(other)?,
        }

        // Validate before persisting so a bad value never reaches disk
        self.config.validate()?;
        self.config.save(&self.config_path).await?;
        self.ui.success("Configuration updated");
        Ok(())
    }

    fn apply(&mut self, command: ConfigCommand) -> Result<()> {
        match command {
            ConfigCommand::SetChatEndpoint { url } => self.config.chat_endpoint = url,
            ConfigCommand::SetSensorEndpoint { url } => self.config.sensor_endpoint = url,
            ConfigCommand::SetModel { name } => self.config.text_model = name,
            ConfigCommand::SetVisionModel { name } => self.config.vision_model = name,
            ConfigCommand::SetTimeout { seconds } => self.config.timeout = seconds,
            ConfigCommand::SetVerbose { enabled } => self.config.verbose = parse_bool(&enabled)?,
            ConfigCommand::Show | ConfigCommand::Reset => {}
        }
        Ok(())
    }

    fn show(&self) {
        self.ui.card(
            "Configuration",
            vec![
                ("Config file", self.config_path.display().to_string()),
                ("Chat endpoint", self.config.chat_endpoint.clone()),
                ("Sensor endpoint", self.config.sensor_endpoint.clone()),
                ("Text model", self.config.text_model.clone()),
                ("Vision model", self.config.vision_model.clone()),
                ("Timeout", format!("{}s", self.config.timeout)),
                ("Verbose", self.config.verbose.to_string()),
                ("Storage", self.config.storage_dir.display().to_string()),
            ],
        );
    }
}
