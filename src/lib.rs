//! vid2gif - HTTP service that converts uploaded videos to animated GIFs
//!
//! All transcoding is delegated to an external tool (ffmpeg). Each request
//! is handled synchronously end to end: the upload is saved to a uniquely
//! named scratch file, the tool is invoked with the scratch file as source
//! and a `.gif`-suffixed destination, and the result is streamed back.
//! Temporary files are removed when the request finishes, whatever the
//! outcome.

pub mod cli;
pub mod config;
pub mod convert;
pub mod scratch;
pub mod web;

pub use cli::{Cli, Commands, ServeArgs};
pub use config::Config;
pub use convert::{ConvertError, GifConverter};
pub use scratch::{Scratch, ScratchPair, GIF_SUFFIX};
pub use web::{AppError, AppState, ServerConfig, WebServer};

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
}
