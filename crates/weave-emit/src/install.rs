//! Installation-assembly entrypoints.
//!
//! Categories append import/body/footer fragments per deployment target
//! during emission; at the end of the pass the buffers are applied into a
//! fixed template and written through the idempotent writer like any other
//! module.

use std::fmt::Write as _;

use weave_model::Result;

use crate::writer::ModuleWriter;

/// Deployment target of an installation entrypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallTarget {
    Server,
    Client,
}

impl InstallTarget {
    pub const BOTH: [InstallTarget; 2] = [InstallTarget::Server, InstallTarget::Client];

    /// Extension-less inner path of this target's entrypoint module.
    pub fn inner_path(self) -> &'static str {
        match self {
            InstallTarget::Server => "install.server",
            InstallTarget::Client => "install.client",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImportKind {
    Default,
    Namespace,
}

#[derive(Debug, Clone)]
struct ImportLine {
    binding: String,
    /// Extension-less inner path of the imported generated module.
    inner: String,
    kind: ImportKind,
}

#[derive(Debug, Clone, Default)]
struct TargetBuffers {
    imports: Vec<ImportLine>,
    body: Vec<String>,
    footer: Vec<String>,
}

/// Ordered fragment buffers for both installation entrypoints.
#[derive(Debug, Clone, Default)]
pub struct InstallAssembly {
    server: TargetBuffers,
    client: TargetBuffers,
}

enum Syntax {
    Esm,
    Cjs,
}

impl InstallAssembly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import a generated module's default export (by extension-less inner
    /// path) under the given binding.
    pub fn push_import(&mut self, target: InstallTarget, binding: &str, inner: &str) {
        self.buffers_mut(target).imports.push(ImportLine {
            binding: binding.to_string(),
            inner: inner.to_string(),
            kind: ImportKind::Default,
        });
    }

    /// Import a generated module's whole namespace under the given binding,
    /// for modules that expose named exports instead of a default.
    pub fn push_namespace_import(&mut self, target: InstallTarget, binding: &str, inner: &str) {
        self.buffers_mut(target).imports.push(ImportLine {
            binding: binding.to_string(),
            inner: inner.to_string(),
            kind: ImportKind::Namespace,
        });
    }

    /// Append a statement to the body of `install(context)`. The line must
    /// be syntax-neutral JavaScript: it is rendered verbatim into both the
    /// ESM and CommonJS entrypoints.
    pub fn push_body(&mut self, target: InstallTarget, line: &str) {
        self.buffers_mut(target).body.push(line.to_string());
    }

    /// Append a line after the install function, rendered verbatim into
    /// both entrypoints.
    pub fn push_footer(&mut self, target: InstallTarget, line: &str) {
        self.buffers_mut(target).footer.push(line.to_string());
    }

    /// Render both entrypoints through the fixed template and write them.
    pub fn apply(&self, writer: &mut ModuleWriter) -> Result<()> {
        for target in InstallTarget::BOTH {
            let module = self.render(target, &Syntax::Esm);
            let runtime = self.render(target, &Syntax::Cjs);
            writer.write_module(target.inner_path(), &module, Some(&runtime), None)?;
        }
        Ok(())
    }

    fn buffers_mut(&mut self, target: InstallTarget) -> &mut TargetBuffers {
        match target {
            InstallTarget::Server => &mut self.server,
            InstallTarget::Client => &mut self.client,
        }
    }

    fn buffers(&self, target: InstallTarget) -> &TargetBuffers {
        match target {
            InstallTarget::Server => &self.server,
            InstallTarget::Client => &self.client,
        }
    }

    fn render(&self, target: InstallTarget, syntax: &Syntax) -> String {
        let buffers = self.buffers(target);
        let mut out = String::from("// Generated by weave. Do not edit.\n");
        for import in &buffers.imports {
            match syntax {
                Syntax::Esm => {
                    let binding = match import.kind {
                        ImportKind::Default => import.binding.clone(),
                        ImportKind::Namespace => format!("* as {}", import.binding),
                    };
                    let _ = writeln!(out, "import {} from \"./{}.mjs\";", binding, import.inner);
                }
                // A generated CommonJS module *is* its namespace, so both
                // import kinds require the same way.
                Syntax::Cjs => {
                    let _ = writeln!(
                        out,
                        "const {} = require(\"./{}.cjs\");",
                        import.binding, import.inner
                    );
                }
            }
        }
        out.push('\n');
        match syntax {
            Syntax::Esm => out.push_str("export function install(context) {\n"),
            Syntax::Cjs => out.push_str("module.exports.install = function install(context) {\n"),
        }
        for line in &buffers.body {
            let _ = writeln!(out, "  {line}");
        }
        match syntax {
            Syntax::Esm => out.push_str("}\n"),
            Syntax::Cjs => out.push_str("};\n"),
        }
        for line in &buffers.footer {
            let _ = writeln!(out, "{line}");
        }
        out
    }
}
