//! The incremental-rebuild gate.
//!
//! A timestamp persisted after each fully successful pass short-circuits
//! the next one when nothing under the module roots changed since. The
//! stamp is only ever written after success, so a half-failed pass is
//! retried in full.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::debug;
use weave_model::{LinkError, Result};

/// Environment variable forcing a full rebuild regardless of timestamps.
pub const FORCE_ENV: &str = "WEAVE_FORCE";

/// Stamp file name under the output root.
pub const STAMP_FILE: &str = ".weave-stamp";

pub struct Gate {
    stamp_path: PathBuf,
}

impl Gate {
    pub fn new(output_root: &Path) -> Self {
        Self {
            stamp_path: output_root.join(STAMP_FILE),
        }
    }

    /// Whether the whole pass can be skipped.
    ///
    /// Never errors: anything suspicious (missing or corrupt stamp,
    /// unreadable input) falls through to a full pass, which will surface
    /// real problems with proper paths.
    pub fn should_skip(&self, module_roots: &[PathBuf], force: bool) -> bool {
        if force || env_forced() {
            debug!("full rebuild forced");
            return false;
        }
        let Some(stamp) = self.read_stamp() else {
            return false;
        };
        let mut newest: Option<DateTime<Utc>> = None;
        for root in module_roots {
            match newest_mtime(root) {
                Ok(candidate) => newest = newest.max(candidate),
                Err(error) => {
                    debug!(root = %root.display(), %error, "cannot stat module root, not skipping");
                    return false;
                }
            }
        }
        match newest {
            Some(newest) => newest <= stamp,
            None => true,
        }
    }

    /// Persist the last-successful-run timestamp.
    pub fn commit(&self) -> Result<()> {
        if let Some(parent) = self.stamp_path.parent() {
            fs::create_dir_all(parent).map_err(|source| LinkError::Write {
                path: self.stamp_path.clone(),
                source,
            })?;
        }
        let now = Utc::now().to_rfc3339();
        fs::write(&self.stamp_path, format!("{now}\n")).map_err(|source| LinkError::Write {
            path: self.stamp_path.clone(),
            source,
        })
    }

    fn read_stamp(&self) -> Option<DateTime<Utc>> {
        let text = fs::read_to_string(&self.stamp_path).ok()?;
        match DateTime::parse_from_rfc3339(text.trim()) {
            Ok(stamp) => Some(stamp.with_timezone(&Utc)),
            Err(error) => {
                debug!(path = %self.stamp_path.display(), %error, "corrupt stamp, ignoring");
                None
            }
        }
    }
}

fn env_forced() -> bool {
    std::env::var(FORCE_ENV).is_ok_and(|value| !value.is_empty() && value != "0")
}

/// Newest modification time under `path`, directories included so renames
/// and deletions count as changes.
fn newest_mtime(path: &Path) -> std::io::Result<Option<DateTime<Utc>>> {
    let metadata = fs::metadata(path)?;
    let mut newest = metadata.modified().ok().map(to_utc);
    if metadata.is_dir() {
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            newest = newest.max(newest_mtime(&entry.path())?);
        }
    }
    Ok(newest)
}

fn to_utc(time: SystemTime) -> DateTime<Utc> {
    time.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn no_stamp_means_no_skip() {
        let out = TempDir::new().unwrap();
        let modules = TempDir::new().unwrap();
        let gate = Gate::new(out.path());
        assert!(!gate.should_skip(&[modules.path().to_path_buf()], false));
    }

    #[test]
    fn committed_stamp_skips_unchanged_input() {
        let out = TempDir::new().unwrap();
        let modules = TempDir::new().unwrap();
        fs::write(modules.path().join("file"), "content").unwrap();

        let gate = Gate::new(out.path());
        gate.commit().unwrap();
        assert!(gate.should_skip(&[modules.path().to_path_buf()], false));
    }

    #[test]
    fn force_flag_overrides_the_stamp() {
        let out = TempDir::new().unwrap();
        let modules = TempDir::new().unwrap();
        let gate = Gate::new(out.path());
        gate.commit().unwrap();
        assert!(!gate.should_skip(&[modules.path().to_path_buf()], true));
    }

    #[test]
    fn corrupt_stamp_means_no_skip() {
        let out = TempDir::new().unwrap();
        let modules = TempDir::new().unwrap();
        let gate = Gate::new(out.path());
        fs::write(out.path().join(STAMP_FILE), "not a timestamp").unwrap();
        assert!(!gate.should_skip(&[modules.path().to_path_buf()], false));
    }
}
