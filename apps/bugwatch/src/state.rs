//! Seen-set persistence for the notifier.
//!
//! The state file is a JSON array of bug ids, replaced wholesale on save.
//! There is no locking; overlapping runs race and the last writer wins.

use crate::error::StateError;
use crate::models::{Bug, SeenSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// JSON file holding the ids seen by the last notifier run.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ids saved by the previous run; empty when no state file exists yet.
    pub fn load(&self) -> Result<SeenSet, StateError> {
        let s = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file; starting empty");
                return Ok(SeenSet::new());
            }
            Err(e) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source: Box::new(e),
                })
            }
        };
        let ids: Vec<u64> = serde_json::from_str(&s).map_err(|e| StateError::Read {
            path: self.path.clone(),
            source: Box::new(e),
        })?;
        Ok(ids.into_iter().collect())
    }

    /// Replace the stored set with `current`.
    pub fn save(&self, current: &SeenSet) -> Result<(), StateError> {
        let write_err = |source: std::io::Error| StateError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }
        let ids: Vec<u64> = current.iter().copied().collect();
        let body = serde_json::to_string(&ids).map_err(|e| write_err(e.into()))?;
        fs::write(&self.path, body).map_err(write_err)?;
        debug!(path = %self.path.display(), count = ids.len(), "saved state");
        Ok(())
    }
}

/// Id set of `bugs`.
pub fn ids(bugs: &[Bug]) -> SeenSet {
    bugs.iter().map(|b| b.id).collect()
}

/// Bugs in `current` whose id is not in `previous`, in `current` order.
pub fn diff(current: &[Bug], previous: &SeenSet) -> Vec<Bug> {
    current
        .iter()
        .filter(|b| !previous.contains(&b.id))
        .cloned()
        .collect()
}
