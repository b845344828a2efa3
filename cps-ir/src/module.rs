//! ModuleContext: the top-level container (spec.md §4.5) plus the
//! deferred-toolchain strategy (spec.md §9 "Deferred toolchain invocation").

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::defs::Def;
use crate::error::{CoreError, Result};
use crate::import::{self, ImportedModule};

/// The serialized module document (spec.md §6 "Serialized module document").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub module: String,
    pub type_table: Vec<Value>,
    pub defs: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Sealed,
    Released,
}

/// Injectable strategy for the external optimizer/linker invocation
/// (spec.md §9: "model this as a small strategy interface so tests can
/// inject a stub that just records the document").
pub trait ToolchainStrategy {
    /// Consumes the freshly-written document path and the module's base
    /// name, producing (or pretending to produce) a linked shared object.
    fn compile(&self, module_name: &str, document_path: &Path) -> Result<()>;
}

/// Shells out to `anyopt` then `clang`, mirroring the reference driver.
pub struct ExternalToolchain;

impl ToolchainStrategy for ExternalToolchain {
    fn compile(&self, module_name: &str, document_path: &Path) -> Result<()> {
        run_step(
            "anyopt",
            Command::new("anyopt")
                .args(["--emit-llvm", "-o", module_name])
                .arg(document_path),
        )?;
        run_step(
            "clang",
            Command::new("clang")
                .arg("-shared")
                .arg(format!("{module_name}.ll"))
                .args(["-o", &format!("{module_name}.so")]),
        )?;
        Ok(())
    }
}

/// Records the document path without touching the filesystem further —
/// used by tests and by `document`-mode modules that don't target a
/// shared object at all.
pub struct RecordingToolchain {
    pub invocations: RefCell<Vec<PathBuf>>,
}

impl RecordingToolchain {
    pub fn new() -> Self {
        Self {
            invocations: RefCell::new(Vec::new()),
        }
    }
}

impl Default for RecordingToolchain {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolchainStrategy for RecordingToolchain {
    fn compile(&self, _module_name: &str, document_path: &Path) -> Result<()> {
        self.invocations.borrow_mut().push(document_path.to_path_buf());
        Ok(())
    }
}

fn run_step(step: &str, command: &mut Command) -> Result<()> {
    log::trace!("invoking toolchain step `{step}`");
    let output = command.output().map_err(|source| CoreError::ToolchainSpawn {
        step: step.to_string(),
        source,
    })?;
    if !output.status.success() {
        return Err(CoreError::ToolchainFailed {
            step: step.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    log::trace!("toolchain step `{step}` succeeded");
    Ok(())
}

/// Whether a sealed module should also produce a linked shared object
/// (`module-target` mode) or only the JSON document.
pub enum SealTarget {
    DocumentOnly,
    Module { toolchain: Box<dyn ToolchainStrategy> },
}

/// The top-level container: type table, def table, module metadata, and
/// the open/sealed/released lifecycle (spec.md §3 "Lifecycles").
pub struct ModuleContext {
    name: String,
    pub(crate) type_table: Vec<Value>,
    pub(crate) defs: Vec<Value>,
    state: State,
    pending: Vec<Def>,
    imported: HashMap<String, Def>,
    seal_target: SealTarget,
    keep_build_files: bool,
}

impl ModuleContext {
    /// `open(name) → ctx`.
    pub fn open(name: impl Into<String>) -> Self {
        Self::open_with_target(name, SealTarget::DocumentOnly)
    }

    pub fn open_with_target(name: impl Into<String>, seal_target: SealTarget) -> Self {
        let keep_build_files = std::env::var("KEEP_BUILD_FILES")
            .map(|v| v != "0")
            .unwrap_or(false);
        let name = name.into();
        log::debug!("opened module `{name}`");
        ModuleContext {
            name,
            type_table: Vec::new(),
            defs: Vec::new(),
            state: State::Open,
            pending: Vec::new(),
            imported: HashMap::new(),
            seal_target,
            keep_build_files,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn ensure_open(&self) {
        if self.state != State::Open {
            panic!(
                "module `{}` is {:?}, cannot accept further definitions",
                self.name, self.state
            );
        }
    }

    /// Registers a continuation (or any def) so it is materialized at
    /// seal time even if nothing else references it — the deferred
    /// registration scoped construction relies on (spec.md §4.3).
    pub fn register(&mut self, def: Def) {
        self.ensure_open();
        self.pending.push(def);
    }

    /// `add(def) → name`: forwards to the def's materialization.
    pub fn add(&mut self, def: &Def) -> std::rc::Rc<str> {
        self.ensure_open();
        def.materialize(self)
    }

    pub(crate) fn push_type_entry(&mut self, entry: Value) -> usize {
        self.ensure_open();
        let index = self.type_table.len();
        self.type_table.push(entry);
        index
    }

    pub(crate) fn push_def_entry(&mut self, entry: Value) -> usize {
        self.ensure_open();
        let index = self.defs.len();
        self.defs.push(entry);
        index
    }

    pub(crate) fn next_def_index(&self) -> usize {
        self.defs.len()
    }

    pub(crate) fn next_type_index(&self) -> usize {
        self.type_table.len()
    }

    /// `serialize() → document`.
    pub fn serialize(&self) -> Document {
        Document {
            module: self.name.clone(),
            type_table: self.type_table.clone(),
            defs: self.defs.clone(),
        }
    }

    /// `include(file)`: imports an already-serialized module document.
    pub fn include_document(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.ensure_open();
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CoreError::ReadDocument {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Document = serde_json::from_str(&text)?;
        let ImportedModule { imported_defs, .. } = import::import_document(&document)?;
        self.imported.extend(imported_defs);
        Ok(())
    }

    /// `include(file)` for a front-end source file: first invokes the
    /// front-end compiler to produce a `.thorin.json`-style document,
    /// then imports it. Reinstated from `thorin.py`'s extension check.
    pub fn include_source(
        &mut self,
        front_end: &str,
        source_path: impl AsRef<Path>,
        emitted_document_path: impl AsRef<Path>,
    ) -> Result<()> {
        self.ensure_open();
        let output = Command::new(front_end)
            .arg("--emit-json")
            .arg("-o")
            .arg(emitted_document_path.as_ref())
            .arg(source_path.as_ref())
            .output()
            .map_err(|source| CoreError::ToolchainSpawn {
                step: front_end.to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(CoreError::FrontEndFailed {
                tool: front_end.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        self.include_document(emitted_document_path)
    }

    /// `lookupImported(name) → def`.
    pub fn lookup_imported(&self, name: &str) -> Option<Def> {
        self.imported.get(name).cloned()
    }

    /// `seal()`: materializes any pending registrations, writes the
    /// document to disk, and — in module-target mode — invokes the
    /// external toolchain. Returns the final document either way.
    pub fn seal(&mut self) -> Result<Document> {
        self.ensure_open();
        let pending = std::mem::take(&mut self.pending);
        for def in pending {
            def.materialize(self);
        }

        let document = self.serialize();
        let document_path = PathBuf::from(format!("{}.thorin.json", self.name));
        let text = serde_json::to_string_pretty(&document)
            .expect("a Document built entirely from JSON-safe values always serializes");
        std::fs::write(&document_path, &text).map_err(|source| CoreError::WriteDocument {
            path: document_path.clone(),
            source,
        })?;

        // The module is sealed the instant its document hits disk, whether
        // or not the toolchain step below succeeds — spec.md §7 requires
        // `seal()` failure to still leave the context unable to accept
        // further definitions, so this must not wait on `?` below.
        self.state = State::Sealed;

        let compiled = match &self.seal_target {
            SealTarget::DocumentOnly => false,
            SealTarget::Module { toolchain } => {
                toolchain.compile(&self.name, &document_path)?;
                true
            }
        };

        if compiled && !self.keep_build_files {
            let _ = std::fs::remove_file(&document_path);
            let _ = std::fs::remove_file(format!("{}.ll", self.name));
            let _ = std::fs::remove_file(format!("{}.so", self.name));
        }
        log::debug!(
            "sealed module `{}`: {} types, {} defs",
            self.name,
            document.type_table.len(),
            document.defs.len()
        );
        Ok(document)
    }
}

impl Drop for ModuleContext {
    fn drop(&mut self) {
        // On toolchain failure, `seal()` returns Err before this flips to
        // Sealed, and artifacts are retained regardless of
        // KEEP_BUILD_FILES for diagnosis (spec.md §7).
        self.state = State::Released;
    }
}
