//! Linker run options.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Options for one `compile` invocation, built by the host application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkOptions {
    /// Module directories to scan, in configured order.
    pub module_roots: Vec<PathBuf>,
    /// Root of the generated output (module tree, runtime tree, stamp).
    pub output_root: PathBuf,
    /// Run the full pass even when the incremental gate would skip it.
    pub force: bool,
    /// Scan and resolve without writing any output or the stamp.
    pub dry_run: bool,
}

impl LinkOptions {
    pub fn new(module_roots: Vec<PathBuf>, output_root: PathBuf) -> Self {
        Self {
            module_roots,
            output_root,
            force: false,
            dry_run: false,
        }
    }
}
