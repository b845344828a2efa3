//! Layout queries (spec.md §4.2 "sizeof/alignof").

use super::{Def, DefKind};
use crate::types::Type;

impl Def {
    pub fn sizeof(ty: Type) -> Def {
        Def::new(DefKind::Sizeof { ty })
    }

    pub fn alignof(ty: Type) -> Def {
        Def::new(DefKind::Alignof { ty })
    }
}
