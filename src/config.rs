//! Layered configuration
//!
//! Values come from an optional TOML config file (`./vid2gif.toml`, then
//! the user config directory), overridden by CLI flags. CLI flags only
//! override when they differ from the clap defaults, so a config file can
//! provide defaults without being clobbered.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::cli::{ServeArgs, DEFAULT_UPLOAD_LIMIT_MB};
use crate::web::{ServerConfig, DEFAULT_BIND, DEFAULT_PORT};

/// Config file name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "vid2gif.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub convert: ConvertSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub upload_limit_mb: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConvertSection {
    pub ffmpeg: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub scratch_dir: Option<PathBuf>,
}

impl Config {
    /// Load from the first existing config file, or defaults when none.
    pub fn load() -> anyhow::Result<Config> {
        for path in Self::search_paths() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }
        Ok(Config::default())
    }

    /// Load a specific config file.
    pub fn load_from_path(path: &Path) -> anyhow::Result<Config> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Candidate config file locations, in precedence order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("vid2gif").join("config.toml"));
        }
        paths
    }

    /// Merge file values with CLI flags into the effective server config.
    pub fn merge_with_cli(&self, args: &ServeArgs) -> ServerConfig {
        let mut config = ServerConfig::default();

        if let Some(bind) = &self.server.bind {
            config.bind = bind.clone();
        }
        if let Some(port) = self.server.port {
            config.port = port;
        }
        if let Some(mb) = self.server.upload_limit_mb {
            config.upload_limit = mb * 1024 * 1024;
        }
        if let Some(tool) = &self.convert.ffmpeg {
            config.tool = tool.clone();
        }
        if let Some(secs) = self.convert.timeout_secs {
            config.convert_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = &self.convert.scratch_dir {
            config.scratch_dir = Some(dir.clone());
        }

        // CLI overrides, only where the user deviated from the defaults.
        if args.bind != DEFAULT_BIND {
            config.bind = args.bind.clone();
        }
        if args.port != DEFAULT_PORT {
            config.port = args.port;
        }
        if args.upload_limit != DEFAULT_UPLOAD_LIMIT_MB {
            config.upload_limit = args.upload_limit * 1024 * 1024;
        }
        if let Some(tool) = &args.ffmpeg {
            config.tool = tool.clone();
        }
        if let Some(secs) = args.convert_timeout {
            config.convert_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = &args.scratch_dir {
            config.scratch_dir = Some(dir.clone());
        }

        config
    }
}
