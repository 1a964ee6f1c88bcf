//! Deduplicating, idempotent module emission.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;
use weave_model::{LinkError, Result};

/// Subdirectory holding the readable ESM tree.
pub const MODULE_TREE: &str = "modules";
/// Subdirectory mirroring the runtime CommonJS layout.
pub const RUNTIME_TREE: &str = "runtime";

const MODULE_EXT: &str = "mjs";
const RUNTIME_EXT: &str = "cjs";
const STUB_EXT: &str = "d.mts";

/// Writes generated modules into the two parallel output trees.
///
/// Every write is guarded by a byte comparison against what is already on
/// disk, so an unchanged pass performs zero writes and downstream
/// file-watchers stay quiet.
pub struct ModuleWriter {
    module_root: PathBuf,
    runtime_root: PathBuf,
    dry_run: bool,
    written: usize,
    unchanged: usize,
}

impl ModuleWriter {
    pub fn new(output_root: &Path, dry_run: bool) -> Self {
        Self {
            module_root: output_root.join(MODULE_TREE),
            runtime_root: output_root.join(RUNTIME_TREE),
            dry_run,
            written: 0,
            unchanged: 0,
        }
    }

    /// Emit one generated module.
    ///
    /// `inner` is the extension-less path under each tree: module content
    /// lands at `modules/<inner>.mjs`, runtime content at
    /// `runtime/<inner>.cjs`, and the optional declaration stub at
    /// `modules/<inner>.d.mts`.
    pub fn write_module(
        &mut self,
        inner: &str,
        module: &str,
        runtime: Option<&str>,
        stub: Option<&str>,
    ) -> Result<()> {
        let module_path = self.module_root.join(format!("{inner}.{MODULE_EXT}"));
        self.write_if_changed(&module_path, module)?;
        if let Some(content) = runtime {
            let runtime_path = self.runtime_root.join(format!("{inner}.{RUNTIME_EXT}"));
            self.write_if_changed(&runtime_path, content)?;
        }
        if let Some(content) = stub {
            let stub_path = self.module_root.join(format!("{inner}.{STUB_EXT}"));
            self.write_if_changed(&stub_path, content)?;
        }
        Ok(())
    }

    /// Files written this pass (or that would have been, on a dry run).
    pub fn written(&self) -> usize {
        self.written
    }

    /// Files found already up to date.
    pub fn unchanged(&self) -> usize {
        self.unchanged
    }

    fn write_if_changed(&mut self, path: &Path, content: &str) -> Result<()> {
        match fs::read(path) {
            Ok(existing) if existing == content.as_bytes() => {
                self.unchanged += 1;
                return Ok(());
            }
            Ok(_) => {}
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(LinkError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
        self.written += 1;
        if self.dry_run {
            debug!(path = %path.display(), "dry run, not writing");
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| LinkError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| LinkError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "wrote module");
        Ok(())
    }
}
