//! Coercions (spec.md §4.2 "Casts"): `cast` (value-preserving numeric
//! conversion) and `bitcast` (reinterpret, same bit width).

use super::{Def, DefKind};
use crate::types::Type;

impl Def {
    pub fn cast(&self, target: Type) -> Def {
        Def::new(DefKind::Cast {
            source: self.clone(),
            target,
        })
    }

    pub fn bitcast(&self, target: Type) -> Def {
        Def::new(DefKind::Bitcast {
            source: self.clone(),
            target,
        })
    }
}
