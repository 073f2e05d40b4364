//! Command-line interface definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::web::{DEFAULT_BIND, DEFAULT_PORT};

/// Default upload limit in megabytes.
pub const DEFAULT_UPLOAD_LIMIT_MB: usize = 512;

/// vid2gif - video upload to animated GIF conversion service
#[derive(Parser, Debug)]
#[command(name = "vid2gif", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP conversion server
    Serve(ServeArgs),
    /// Show version, tool availability, and config locations
    Info,
}

impl Default for Commands {
    /// Invoking the binary with no arguments serves with defaults.
    fn default() -> Self {
        Commands::Serve(ServeArgs::default())
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Maximum upload size in megabytes
    #[arg(long, value_name = "MB", default_value_t = DEFAULT_UPLOAD_LIMIT_MB)]
    pub upload_limit: usize,

    /// Per-conversion timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub convert_timeout: Option<u64>,

    /// Path to the conversion tool (default: ffmpeg on PATH)
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Directory for temporary conversion files
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Config file to load instead of the default locations
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            upload_limit: DEFAULT_UPLOAD_LIMIT_MB,
            convert_timeout: None,
            ffmpeg: None,
            scratch_dir: None,
            config: None,
        }
    }
}
