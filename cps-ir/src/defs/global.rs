//! Module-scope globals (spec.md §4.2 "Global").

use super::{Def, DefKind};

impl Def {
    pub fn global(init: Def, mutable: bool) -> Def {
        Def::new(DefKind::Global {
            init,
            mutable,
            external: None,
        })
    }

    /// A global with a fixed external link name, e.g. a string literal's
    /// backing array (spec.md §4.4 "string").
    pub fn global_named(init: Def, mutable: bool, external: impl Into<String>) -> Def {
        Def::new(DefKind::Global {
            init,
            mutable,
            external: Some(external.into()),
        })
    }
}
