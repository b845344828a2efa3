//! ImportResolver (spec.md §4.6): turns a serialized module document
//! back into live type/def handles so a consumer can call into, or
//! extend, an already-built module.

use std::collections::HashMap;

use crate::continuation;
use crate::defs::Def;
use crate::error::Result;
use crate::module::Document;
use crate::types::reconstruct::reconstruct_table;
use crate::types::Type;

/// The live handles recovered from one imported [`Document`].
pub struct ImportedModule {
    pub types: HashMap<String, Type>,
    /// Internal-linkage continuation stubs, keyed by their link name —
    /// what [`crate::module::ModuleContext::lookup_imported`] serves.
    pub imported_defs: HashMap<String, Def>,
}

/// `import(document) → ImportedModule`.
///
/// For every def entry carrying an `"internal"` link name, builds a
/// continuation stub the rest of the importing module can apply to.
/// The source project always gave these stubs type `fn()` regardless
/// of what the def actually was — a real type is available any time
/// the entry is itself a `"continuation"` with a resolvable `fn_type`,
/// so we recover it there and only fall back to `fn()` when we can't
/// (spec.md §9 open question).
pub fn import_document(document: &Document) -> Result<ImportedModule> {
    let types = reconstruct_table(&document.type_table)?;

    let mut imported_defs = HashMap::new();
    for entry in &document.defs {
        let Some(internal) = entry.get("internal").and_then(|v| v.as_str()) else {
            continue;
        };
        let fn_type = entry
            .get("type")
            .and_then(|v| v.as_str())
            .filter(|kind| *kind == "continuation")
            .and_then(|_| entry.get("fn_type"))
            .and_then(|v| v.as_str())
            .and_then(|name| types.get(name))
            .cloned()
            .unwrap_or_else(|| Type::function(vec![]));

        let scope = continuation::continuation_internal(fn_type, internal);
        imported_defs.insert(internal.to_string(), scope.continuation);
    }

    Ok(ImportedModule {
        types,
        imported_defs,
    })
}
