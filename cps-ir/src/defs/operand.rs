//! Operand lifting: letting callers write `x.add(1)` instead of building
//! an explicit `qs32` constant by hand (spec.md §4.2 "literal lifting",
//! §9 design note on replacing operator overloading with explicit
//! methods).
//!
//! The source library only lifted the right-hand operand (`self + 3`
//! worked, `3 + self` didn't, since Python dispatches `__add__` on the
//! left operand first). Both [`ArithOperand`] and [`IndexOperand`] are
//! symmetric here — every arithmetic/compare/extract helper takes
//! `impl Into<ArithOperand>`/`impl Into<IndexOperand>` on every operand
//! position, fixing the asymmetry spec.md calls out.

use crate::defs::{Def, DefKind};
use crate::types::{PrimTag, Type};

/// Anything that can appear as an arithmetic/comparison operand: an
/// existing [`Def`], or a bare integer literal lifted to a `qs32`
/// constant.
pub struct ArithOperand(pub(crate) Def);

impl From<Def> for ArithOperand {
    fn from(def: Def) -> Self {
        ArithOperand(def)
    }
}

impl From<i32> for ArithOperand {
    fn from(value: i32) -> Self {
        ArithOperand(Def::new(DefKind::Constant {
            ty: Type::scalar(PrimTag::Qs32),
            value: value.into(),
        }))
    }
}

impl From<i64> for ArithOperand {
    fn from(value: i64) -> Self {
        ArithOperand(Def::new(DefKind::Constant {
            ty: Type::scalar(PrimTag::Qs32),
            value: value.into(),
        }))
    }
}

/// An operand used to index into an aggregate (`extract`, `variant`
/// discriminants): bare integer literals are lifted to `qu32` rather
/// than `qs32`, since indices are unsigned.
pub struct IndexOperand(pub(crate) Def);

impl From<Def> for IndexOperand {
    fn from(def: Def) -> Self {
        IndexOperand(def)
    }
}

impl From<u32> for IndexOperand {
    fn from(value: u32) -> Self {
        IndexOperand(Def::new(DefKind::Constant {
            ty: Type::scalar(PrimTag::Qu32),
            value: value.into(),
        }))
    }
}

impl From<usize> for IndexOperand {
    fn from(value: usize) -> Self {
        IndexOperand(Def::new(DefKind::Constant {
            ty: Type::scalar(PrimTag::Qu32),
            value: (value as u32).into(),
        }))
    }
}

/// An operand accepted by `store`: just a [`Def`], kept as a distinct
/// type so call sites read `store(mem, ptr, value)` without ambiguity
/// against the arithmetic lifting above.
pub struct StoreOperand(pub(crate) Def);

impl From<Def> for StoreOperand {
    fn from(def: Def) -> Self {
        StoreOperand(def)
    }
}
