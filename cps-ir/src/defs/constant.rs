//! Constant/top/bottom value builders (spec.md §4.2 "Constants").

use serde_json::Value;

use super::{Def, DefKind};
use crate::types::Type;

impl Def {
    /// `const(ty, value)`.
    pub fn constant(ty: Type, value: impl Into<Value>) -> Def {
        Def::new(DefKind::Constant {
            ty,
            value: value.into(),
        })
    }

    /// `top(ty)`: the "don't care, pick anything" value of `ty`.
    pub fn top(ty: Type) -> Def {
        Def::new(DefKind::Top { ty })
    }

    /// `bottom(ty)`: the def-level unreachable value of `ty` (distinct
    /// from [`crate::types::Type::bottom`], the never-inhabited type).
    pub fn bottom_value(ty: Type) -> Def {
        Def::new(DefKind::Bottom { ty })
    }
}
