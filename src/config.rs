//! Options handed to sources when readers are created.
//!
//! With the `config` feature enabled, options can be loaded from a TOML file:
//!
//! ```toml
//! buffer_capacity = 131072
//! compression = "gzip"
//! ```

use crate::decompression::{CompressionMode, DecompressByFilename, DecompressingChannelFactory};
use crate::error::{Result, SourceError};
use std::sync::Arc;

/// Which decompression strategy to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum CompressionSetting {
    /// Choose from the file name
    #[default]
    Auto,
    Gzip,
    Bzip2,
}

impl CompressionSetting {
    pub fn channel_factory(&self) -> Arc<dyn DecompressingChannelFactory> {
        match self {
            Self::Auto => Arc::new(DecompressByFilename),
            Self::Gzip => Arc::new(CompressionMode::Gzip),
            Self::Bzip2 => Arc::new(CompressionMode::Bzip2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ReadOptions {
    /// Buffer size for readers consuming decompressed bytes
    pub buffer_capacity: usize,
    pub compression: CompressionSetting,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: 64 * 1024,
            compression: CompressionSetting::Auto,
        }
    }
}

impl ReadOptions {
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(SourceError::invalid_configuration(
                "buffer_capacity must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "config")]
impl ReadOptions {
    /// Default options file: `<config dir>/ccat/config.toml`
    pub fn default_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ccat").join("config.toml"))
    }

    /// Load options from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SourceError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let options: Self = toml::from_str(&text).map_err(|e| {
            SourceError::config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Load from the default path if that file exists, otherwise use defaults
    pub fn load_or_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ReadOptions::default();
        assert_eq!(options.compression, CompressionSetting::Auto);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_buffer_is_invalid() {
        let options = ReadOptions {
            buffer_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(SourceError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_compression_setting_factories() {
        assert_eq!(CompressionSetting::Auto.channel_factory().name(), "by-filename");
        assert_eq!(CompressionSetting::Gzip.channel_factory().name(), "gzip");
        assert_eq!(CompressionSetting::Bzip2.channel_factory().name(), "bzip2");
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_load_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "compression = \"bzip2\"\n").unwrap();

        let options = ReadOptions::load(&path).unwrap();
        assert_eq!(options.compression, CompressionSetting::Bzip2);
        assert_eq!(options.buffer_capacity, 64 * 1024);
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "buffer_capacity = \"big\"\n").unwrap();

        assert!(matches!(
            ReadOptions::load(&path),
            Err(SourceError::ConfigError { .. })
        ));
    }
}
