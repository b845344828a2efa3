//! Synthetic naming: `"_<kind>_<index>"` for table entries, `"<parent>.<index>"`
//! for continuation parameters (spec.md §6 "Naming convention").

use std::cell::OnceCell;
use std::rc::Rc;

/// Lazily-assigned, append-only name cache shared by every type/def handle.
///
/// Once a node is materialized its name never changes, so this is a thin
/// wrapper over `OnceCell` rather than a `RefCell` — the empty-string
/// sentinel the original Python builder used (`self.cache = ""`) is
/// replaced by the type-level guarantee that an unset cache has no value.
#[derive(Debug, Default)]
pub struct NameCache(OnceCell<Rc<str>>);

impl NameCache {
    pub fn new() -> Self {
        Self(OnceCell::new())
    }

    /// Returns the cached name, if materialization has already happened.
    pub fn get(&self) -> Option<Rc<str>> {
        self.0.get().cloned()
    }

    /// Reserves `name` in the cache. Must be called exactly once, and must
    /// happen *before* recursing into dependency materialization so that a
    /// self-referential lookup (a continuation naming itself, a struct
    /// field pointing back to its own struct) sees the reservation rather
    /// than looping.
    pub fn reserve(&self, name: Rc<str>) {
        self.0
            .set(name)
            .unwrap_or_else(|_| panic!("materialization name already reserved"));
    }
}

pub fn entry_name(kind: &str, index: usize) -> Rc<str> {
    Rc::from(format!("_{kind}_{index}"))
}

pub fn parameter_name(parent: &str, index: usize) -> Rc<str> {
    Rc::from(format!("{parent}.{index}"))
}
