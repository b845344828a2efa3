//! Memory-threading ops (spec.md §4.2 "Memory ops"): `load`, `store`,
//! `enter`, `slot`, `alloc`, plus the PE-adjacent `run`/`hlt`.

use super::operand::StoreOperand;
use super::{Def, DefKind};
use crate::types::Type;

impl Def {
    pub fn load(mem: Def, ptr: Def) -> Def {
        Def::new(DefKind::Load { mem, ptr })
    }

    pub fn store(mem: Def, ptr: Def, value: impl Into<StoreOperand>) -> Def {
        Def::new(DefKind::Store {
            mem,
            ptr,
            value: value.into().0,
        })
    }

    /// `enter(mem) → frame`: opens a new stack frame threaded off `mem`.
    pub fn enter(mem: Def) -> Def {
        Def::new(DefKind::Enter { mem })
    }

    pub fn slot(frame: Def, ty: Type) -> Def {
        Def::new(DefKind::Slot { frame, ty })
    }

    pub fn alloc(ty: Type, args: Vec<Def>) -> Def {
        Def::new(DefKind::Alloc { ty, args })
    }

    /// `run()`: a fresh memory token with no predecessor, used at the
    /// root of a module-level definition.
    pub fn run() -> Def {
        Def::new(DefKind::Run)
    }

    /// `hlt(target)`: the partial-evaluation "stop, this is dynamic" hint.
    pub fn hlt(target: Def) -> Def {
        Def::new(DefKind::Hlt { target })
    }

    /// `known(value)`: the partial-evaluation "is this statically known"
    /// query.
    pub fn known(value: Def) -> Def {
        Def::new(DefKind::Known { value })
    }
}
