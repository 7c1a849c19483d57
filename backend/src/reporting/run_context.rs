//! Output location of one planner run.

use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::info;

use super::{ReportError, ReportResult};

const RUN_DIR_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A freshly created, run-specific output directory.
///
/// Created once per process and handed to the reporter; an existing
/// directory is never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    root: PathBuf,
    run_dir: PathBuf,
}

impl RunContext {
    /// Create `<root>/<YYYYmmdd_HHMMSS>`, appending `_1`, `_2`, ... when that
    /// name is already taken.
    pub fn create(root: &Path, started: NaiveDateTime) -> ReportResult<Self> {
        std::fs::create_dir_all(root).map_err(|e| ReportError::io(root, e))?;

        let base = started.format(RUN_DIR_FORMAT).to_string();
        let mut attempt = 0usize;
        loop {
            let name = if attempt == 0 {
                base.clone()
            } else {
                format!("{}_{}", base, attempt)
            };
            let candidate = root.join(name);
            match std::fs::create_dir(&candidate) {
                Ok(()) => {
                    info!("Writing reports to {}", candidate.display());
                    return Ok(Self {
                        root: root.to_path_buf(),
                        run_dir: candidate,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(ReportError::io(&candidate, e)),
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Path of an artifact inside the run directory.
    pub fn artifact(&self, file_name: &str) -> PathBuf {
        self.run_dir.join(file_name)
    }
}
