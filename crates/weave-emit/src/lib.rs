//! Code emission for the Weave linker.
//!
//! Two concerns live here: the deduplicating module writer that keeps no-op
//! runs from touching disk, and the installation-assembly buffers that every
//! category appends to and that become the `install.server` /
//! `install.client` entrypoints at the end of a pass.

pub mod install;
pub mod js;
pub mod writer;

pub use install::{InstallAssembly, InstallTarget};
pub use js::{js_ident, js_string};
pub use writer::ModuleWriter;
