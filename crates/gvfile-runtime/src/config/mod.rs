//! Channel configuration
//!
//! Library defaults with runtime environment overrides. The buffer
//! capacity is not here: it is fixed at build time (`GVF_FILE_BUFLEN`,
//! see `gvfile_core::constants::BUF_LEN`).
//!
//! # Configuration Priority (highest wins)
//!
//! 1. Builder calls
//! 2. Environment variables (`from_env`)
//! 3. Library defaults (`defaults.rs`)
//!
//! # Example
//!
//! ```rust,ignore
//! use gvfile_runtime::config::FileConfig;
//!
//! let config = FileConfig::from_env().open_mode(0o600).cloexec(false);
//! config.validate()?;
//! ```

pub mod defaults;

use gvfile_core::env::{env_get_bool, env_get_octal};
use gvfile_core::kprintln;

/// Configuration for opening channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    /// Permission bits used by `GvtFile::create`. `open_with` takes its
    /// mode explicitly and ignores this.
    pub open_mode: u32,
    /// Add O_CLOEXEC to open flags
    pub cloexec: bool,
    /// Log lifecycle events at info level
    pub log_lifecycle: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl FileConfig {
    /// Library defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `GVF_OPEN_MODE` - Octal permission bits for created files
    /// - `GVF_CLOEXEC` - Add O_CLOEXEC on open (0/1)
    /// - `GVF_LOG_LIFECYCLE` - Log open/close at info level (0/1)
    pub fn from_env() -> Self {
        Self {
            open_mode: env_get_octal("GVF_OPEN_MODE", defaults::OPEN_MODE),
            cloexec: env_get_bool("GVF_CLOEXEC", defaults::CLOEXEC),
            log_lifecycle: env_get_bool("GVF_LOG_LIFECYCLE", defaults::LOG_LIFECYCLE),
        }
    }

    /// Library defaults only, no environment lookups.
    pub fn new() -> Self {
        Self {
            open_mode: defaults::OPEN_MODE,
            cloexec: defaults::CLOEXEC,
            log_lifecycle: defaults::LOG_LIFECYCLE,
        }
    }

    // Builder methods

    pub fn open_mode(mut self, mode: u32) -> Self {
        self.open_mode = mode;
        self
    }

    pub fn cloexec(mut self, enable: bool) -> Self {
        self.cloexec = enable;
        self
    }

    pub fn log_lifecycle(mut self, enable: bool) -> Self {
        self.log_lifecycle = enable;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.open_mode > 0o7777 {
            return Err(ConfigError::InvalidValue("open_mode must be <= 0o7777"));
        }
        Ok(())
    }

    /// Print configuration (for debugging)
    pub fn print(&self) {
        kprintln!("gvfile configuration:");
        kprintln!("  buffer capacity:  {}", gvfile_core::constants::BUF_LEN);
        kprintln!("  open_mode:        {:#o}", self.open_mode);
        kprintln!("  cloexec:          {}", self.cloexec);
        kprintln!("  log_lifecycle:    {}", self.log_lifecycle);
    }
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for gvfile_core::FileError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::InvalidValue(msg) => gvfile_core::FileError::InvalidArgument(msg),
        }
    }
}
