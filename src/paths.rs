//! Filesystem layout for a build run.
//!
//! The layout is fixed by convention: the orchestrator binary sits next to
//! the application project it builds, and everything else is a constant
//! offset from that anchor. Nothing here is persisted; paths are recomputed
//! on every run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Name of the application project this tool publishes.
pub const PROJECT_NAME: &str = "SignalScope";

/// Paths used during a single build run.
#[derive(Debug, Clone)]
pub struct BuildPaths {
    /// Directory containing the orchestrator itself (the anchor).
    pub script_dir: PathBuf,
    /// The application project directory (`<anchor>/SignalScope`).
    pub project_dir: PathBuf,
    /// Publish output directory (`<anchor>/bin/publish`).
    pub publish_dir: PathBuf,
}

impl BuildPaths {
    /// Derive the layout from an explicit anchor directory.
    pub fn resolve(script_dir: &Path) -> Self {
        Self {
            project_dir: script_dir.join(PROJECT_NAME),
            publish_dir: script_dir.join("bin").join("publish"),
            script_dir: script_dir.to_path_buf(),
        }
    }

    /// Derive the layout from the location of the running executable.
    pub fn from_current_exe() -> Result<Self> {
        let exe = std::env::current_exe().context("could not locate the running executable")?;
        let script_dir = exe
            .parent()
            .context("executable has no parent directory")?;
        Ok(Self::resolve(script_dir))
    }

    /// Where the published executable is expected to appear.
    pub fn executable(&self) -> PathBuf {
        self.publish_dir.join(format!("{PROJECT_NAME}.exe"))
    }
}
