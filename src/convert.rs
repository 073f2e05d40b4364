//! External conversion tool invocation
//!
//! All transcoding is delegated to an external tool (ffmpeg by default)
//! invoked as `<tool> -y -i <input> <output>`. The tool infers the input
//! format by probing the file and the output format from the `.gif`
//! suffix of the destination path.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

/// Default conversion tool, resolved on PATH.
pub const DEFAULT_TOOL: &str = "ffmpeg";

/// Default per-conversion timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// How much of the tool's stderr to keep in error messages.
const STDERR_TAIL_BYTES: usize = 2048;

/// Conversion error types
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("conversion timed out after {0:?}")]
    Timeout(Duration),

    #[error("tool reported success but produced no output file: {0}")]
    MissingOutput(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Handle to the external video-to-GIF tool.
#[derive(Debug, Clone)]
pub struct GifConverter {
    tool: PathBuf,
    timeout: Duration,
}

impl GifConverter {
    pub fn new(tool: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            tool: tool.into(),
            timeout,
        }
    }

    /// Tool path as configured.
    pub fn tool(&self) -> &Path {
        &self.tool
    }

    /// Whether the tool resolves to an executable.
    pub fn tool_available(&self) -> bool {
        which::which(&self.tool).is_ok()
    }

    /// Arguments passed to the tool for one conversion.
    fn command_args(input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            OsString::from("-y"),
            OsString::from("-i"),
            input.as_os_str().to_os_string(),
            output.as_os_str().to_os_string(),
        ]
    }

    /// Convert `input` into an animated GIF at `output`.
    ///
    /// Waits for the subprocess to exit, bounded by the configured
    /// timeout. The child is killed if the timeout elapses or the caller
    /// is cancelled mid-conversion.
    pub async fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        let mut command = Command::new(&self.tool);
        command
            .args(Self::command_args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(tool = %self.tool.display(), input = %input.display(), "spawning conversion");

        let wait = async {
            command.output().await.map_err(|source| ConvertError::Spawn {
                tool: self.tool.display().to_string(),
                source,
            })
        };

        let result = match tokio::time::timeout(self.timeout, wait).await {
            Ok(result) => result?,
            Err(_) => return Err(ConvertError::Timeout(self.timeout)),
        };

        if !result.status.success() {
            return Err(ConvertError::Failed {
                tool: self.tool.display().to_string(),
                status: result.status,
                stderr: stderr_tail(&result.stderr),
            });
        }

        if !output.exists() {
            return Err(ConvertError::MissingOutput(output.to_path_buf()));
        }

        Ok(())
    }
}

impl Default for GifConverter {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() <= STDERR_TAIL_BYTES {
        return text.to_string();
    }
    let mut start = text.len() - STDERR_TAIL_BYTES;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn test_command_args_calling_convention() {
        let args = GifConverter::command_args(Path::new("/tmp/in"), Path::new("/tmp/in.gif"));
        assert_eq!(args, vec!["-y", "-i", "/tmp/in", "/tmp/in.gif"]);
    }

    #[test]
    fn test_default_converter() {
        let converter = GifConverter::default();
        assert_eq!(converter.tool(), Path::new("ffmpeg"));
        assert_eq!(converter.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_tool_available_for_missing_tool() {
        let converter = GifConverter::new(
            "definitely-not-a-real-tool-7f3a",
            Duration::from_secs(1),
        );
        assert!(!converter.tool_available());
    }

    #[tokio::test]
    async fn test_convert_success_with_stub_tool() {
        let dir = tempfile::tempdir().unwrap();
        // Writes GIF magic bytes to its last argument.
        let tool = write_script(
            dir.path(),
            "stub-ok",
            r#"for out in "$@"; do :; done; printf 'GIF89a' > "$out""#,
        );

        let input = dir.path().join("clip");
        let output = dir.path().join("clip.gif");
        std::fs::write(&input, b"fake video").unwrap();

        let converter = GifConverter::new(&tool, Duration::from_secs(5));
        converter.convert(&input, &output).await.unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"GIF89a");
    }

    #[tokio::test]
    async fn test_convert_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let tool = write_script(dir.path(), "stub-fail", "echo 'boom' >&2; exit 1");

        let input = dir.path().join("clip");
        let output = dir.path().join("clip.gif");
        std::fs::write(&input, b"fake video").unwrap();

        let converter = GifConverter::new(&tool, Duration::from_secs(5));
        let err = converter.convert(&input, &output).await.unwrap_err();
        match err {
            ConvertError::Failed { stderr, .. } => assert!(stderr.contains("boom")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_convert_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        // Exits 0 without creating the output file.
        let tool = write_script(dir.path(), "stub-noop", "exit 0");

        let input = dir.path().join("clip");
        let output = dir.path().join("clip.gif");
        std::fs::write(&input, b"fake video").unwrap();

        let converter = GifConverter::new(&tool, Duration::from_secs(5));
        let err = converter.convert(&input, &output).await.unwrap_err();
        assert!(matches!(err, ConvertError::MissingOutput(_)));
    }

    #[tokio::test]
    async fn test_convert_timeout_kills_child() {
        let dir = tempfile::tempdir().unwrap();
        let tool = write_script(dir.path(), "stub-hang", "sleep 30");

        let input = dir.path().join("clip");
        let output = dir.path().join("clip.gif");
        std::fs::write(&input, b"fake video").unwrap();

        let converter = GifConverter::new(&tool, Duration::from_millis(200));
        let err = converter.convert(&input, &output).await.unwrap_err();
        assert!(matches!(err, ConvertError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_convert_spawn_failure() {
        let converter = GifConverter::new("/nonexistent/tool", Duration::from_secs(1));
        let err = converter
            .convert(Path::new("/tmp/in"), Path::new("/tmp/in.gif"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Spawn { .. }));
    }
}
