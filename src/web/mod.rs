//! Web server module for vid2gif
//!
//! Provides the REST API: upload a video, get the converted GIF back.
//!
//! # Usage
//!
//! ```bash
//! vid2gif serve --port 8000
//! ```

mod routes;
mod server;

pub use routes::{AppError, AppState};
pub use server::{ServerConfig, WebServer};

/// Default server port
pub const DEFAULT_PORT: u16 = 8000;

/// Default bind address
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Default upload limit in bytes (512 MB)
pub const DEFAULT_UPLOAD_LIMIT: usize = 512 * 1024 * 1024;
