//! Scratch directory management for per-request temporary files
//!
//! Each upload gets a uniquely named input/output file pair inside a
//! dedicated scratch directory, removed when the request finishes.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use uuid::Uuid;

/// Suffix appended to the input path to form the output path. The
/// conversion tool infers the target format from it.
pub const GIF_SUFFIX: &str = ".gif";

enum ScratchRoot {
    /// Process-owned directory, removed when the server exits.
    Owned(TempDir),
    /// Caller-configured directory, left in place on exit.
    External(PathBuf),
}

/// Namespace for temporary conversion files.
///
/// Name uniqueness (UUID v4) guarantees two concurrent requests never
/// reference the same path, so no locking is needed.
pub struct Scratch {
    root: ScratchRoot,
}

impl Scratch {
    /// Create a scratch space backed by a fresh process-owned directory.
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("vid2gif-").tempdir()?;
        Ok(Self {
            root: ScratchRoot::Owned(dir),
        })
    }

    /// Use `dir` as the scratch space, creating it if necessary.
    pub fn at(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            root: ScratchRoot::External(dir),
        })
    }

    /// Path of the scratch directory.
    pub fn dir(&self) -> &Path {
        match &self.root {
            ScratchRoot::Owned(dir) => dir.path(),
            ScratchRoot::External(dir) => dir,
        }
    }

    /// Allocate a unique input/output path pair for one request.
    ///
    /// No files are created here; the caller writes the input and the
    /// conversion tool produces the output.
    pub fn allocate(&self) -> ScratchPair {
        let name = Uuid::new_v4().simple().to_string();
        let input = self.dir().join(&name);
        let output = self.dir().join(format!("{name}{GIF_SUFFIX}"));
        ScratchPair { input, output }
    }
}

/// Input/output file pair owned by a single handler invocation.
///
/// Dropping the pair removes both files regardless of how far the
/// conversion got; missing files are ignored.
pub struct ScratchPair {
    input: PathBuf,
    output: PathBuf,
}

impl ScratchPair {
    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

impl Drop for ScratchPair {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.input);
        let _ = std::fs::remove_file(&self.output);
    }
}
