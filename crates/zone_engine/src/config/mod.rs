//! Configuration system
//!
//! Settings types implement [`Config`] and can be read from or written to
//! TOML and RON files; the file extension picks the format.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialisation format of a settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn parse<T: for<'de> Deserialize<'de>>(self, contents: &str) -> Result<T, ConfigError> {
        match self {
            Self::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Self::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    fn render<T: Serialize>(self, value: &T) -> Result<String, ConfigError> {
        match self {
            Self::Toml => toml::to_string_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string())),
            Self::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }
}

/// Loadable, saveable and self-checking settings
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Check the loaded values for consistency
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Parse and validate a document in the given format
    fn from_str_as(contents: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let config: Self = format.parse(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document
    fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::from_str_as(contents, ConfigFormat::Toml)
    }

    /// Parse and validate a RON document
    fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        Self::from_str_as(contents, ConfigFormat::Ron)
    }

    /// Load and validate settings from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_as(&contents, format)
    }

    /// Write settings to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = ConfigFormat::from_path(path)?.render(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is malformed
    #[error("Parse error: {0}")]
    Parse(String),

    /// The settings could not be written out
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// The file extension names no known format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is outside its allowed range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}
