// Required external crates for configuration management and serialization
use serde::Deserialize;
use std::path::PathBuf;
use config::{Config, ConfigError, Environment, File};

/// Configuration for the NLP models backing the API
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Directory where local model files (GGUF) are stored
    pub directory: PathBuf,
    /// Hugging Face repository id of the sentiment classifier
    pub sentiment: String,
    /// File name of the text-generation GGUF model inside `directory`
    pub generation: String,
}

/// Decoding parameters used by the text-generation pipeline
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Controls randomness in generation (0.0-1.0)
    pub temperature: f32,
    /// Number of highest-probability tokens kept for sampling
    pub top_k: i32,
    /// Nucleus sampling cutoff (0.0-1.0)
    pub top_p: f32,
    /// Penalty applied to recently generated tokens
    pub repetition_penalty: f32,
}

/// Configuration for the HTTP server
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Optional log file path
    pub file: Option<PathBuf>,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Model-related settings
    pub models: ModelConfig,
    /// Text-generation decoding settings
    pub generation: GenerationConfig,
    /// Server-related settings
    pub server: ServerConfig,
    /// Logging-related settings
    pub logging: LoggingConfig,
}

impl Settings {
    /// Creates a new Settings instance by loading config from multiple sources
    /// in the following order of precedence (highest to lowest):
    /// 1. Environment variables prefixed with IAPI_ (double underscore
    ///    separates nesting levels, e.g. IAPI_GENERATION__TOP_K, so
    ///    snake_case keys stay addressable)
    /// 2. Local config file (local.toml) if present
    /// 3. Default config file (default.toml)
    pub fn new() -> Result<Self, ConfigError> {
        // Check if current directory exists
        let config_dir = std::env::current_dir()
            .map_err(|e| ConfigError::Message(
                format!("Failed to get current directory: {}", e)
            ))?
            .join("config");

        // Check if config directory exists
        if !config_dir.exists() {
            return Err(ConfigError::Message(
                format!("Config directory not found at: {}", config_dir.display())
            ));
        }

        // Check if default.toml exists
        let default_config = config_dir.join("default.toml");
        if !default_config.exists() {
            return Err(ConfigError::Message(
                format!("Default configuration file not found at: {}", default_config.display())
            ));
        }

        // Create the local config path
        let local_config = config_dir.join("local.toml");

        // Convert paths to strings and keep them alive
        let default_config_path = default_config.to_string_lossy();
        let local_config_path = local_config.to_string_lossy();

        // Load and validate configuration
        let settings = Config::builder()
            .add_source(File::with_name(&default_config_path))
            .add_source(File::with_name(&local_config_path).required(false))
            .add_source(
                Environment::with_prefix("IAPI")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        // Validate settings after loading
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Create models directory if it doesn't exist
        if !self.models.directory.exists() {
            std::fs::create_dir_all(&self.models.directory).map_err(|e| {
                ConfigError::Message(format!(
                    "Failed to create models directory at {}: {}",
                    self.models.directory.display(), e
                ))
            })?;
        }

        // The sentiment model must name a Hugging Face repository
        if self.models.sentiment.trim().is_empty() {
            return Err(ConfigError::Message(
                "models.sentiment must name a Hugging Face repository".to_string()
            ));
        }

        // The generation model is a file name inside the models directory
        if self.models.generation.trim().is_empty() {
            return Err(ConfigError::Message(
                "models.generation must name a GGUF file inside the models directory".to_string()
            ));
        }

        // Validate temperature range
        if !(0.0..=1.0).contains(&self.generation.temperature) {
            return Err(ConfigError::Message(
                format!("Temperature must be between 0.0 and 1.0, got: {}", self.generation.temperature)
            ));
        }

        // Validate top_k
        if self.generation.top_k <= 0 {
            return Err(ConfigError::Message(
                format!("top_k must be greater than 0, got: {}", self.generation.top_k)
            ));
        }

        // Validate top_p range
        if !(0.0..=1.0).contains(&self.generation.top_p) {
            return Err(ConfigError::Message(
                format!("top_p must be between 0.0 and 1.0, got: {}", self.generation.top_p)
            ));
        }

        // Validate repetition penalty (1.0 disables it)
        if self.generation.repetition_penalty < 1.0 {
            return Err(ConfigError::Message(
                format!("repetition_penalty must be at least 1.0, got: {}", self.generation.repetition_penalty)
            ));
        }

        // Validate server port
        if self.server.port == 0 {
            return Err(ConfigError::Message(
                "Port must be between 1 and 65535".to_string()
            ));
        }

        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }?;

        // Create log file directory if configured and doesn't exist
        if let Some(log_file) = &self.logging.file {
            if let Some(parent) = log_file.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        ConfigError::Message(format!(
                            "Failed to create log directory at {}: {}",
                            parent.display(), e
                        ))
                    })?;
                }
            }
        }

        Ok(())
    }

    /// Full path to the GGUF file used by the text-generation pipeline
    pub fn generation_model_path(&self) -> PathBuf {
        self.models.directory.join(&self.models.generation)
    }
}
