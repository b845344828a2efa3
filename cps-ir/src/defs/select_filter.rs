//! `select` (value-level ternary) and `filter` (per-parameter PE hints
//! attached to a continuation — spec.md §4.3 "filter").

use super::{Def, DefKind};

impl Def {
    /// `select(cond, if_true, if_false)`.
    pub fn select(cond: Def, if_true: Def, if_false: Def) -> Def {
        Def::new(DefKind::Select {
            args: vec![cond, if_true, if_false],
        })
    }

    /// A standalone `filter` def list; usually built implicitly via
    /// [`Def::set_filter`](crate::defs::Def::set_filter) instead.
    pub fn filter(args: Vec<Def>) -> Def {
        Def::new(DefKind::Filter { args })
    }
}
