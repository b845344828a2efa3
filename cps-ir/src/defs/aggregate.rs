//! Aggregate construction/decomposition (spec.md §4.2 "Aggregate ops").

use super::operand::IndexOperand;
use super::{Def, DefKind};
use crate::types::Type;

impl Def {
    pub fn extract(&self, index: impl Into<IndexOperand>) -> Def {
        Def::new(DefKind::Extract {
            aggregate: self.clone(),
            index: index.into().0,
        })
    }

    pub fn insert(args: Vec<Def>) -> Def {
        Def::new(DefKind::Insert { args })
    }

    pub fn lea(args: Vec<Def>) -> Def {
        Def::new(DefKind::Lea { args })
    }

    pub fn tuple(args: Vec<Def>) -> Def {
        Def::new(DefKind::Tuple { args })
    }

    pub fn vector(args: Vec<Def>) -> Def {
        Def::new(DefKind::Vector { args })
    }

    pub fn struct_value(ty: Type, args: Vec<Def>) -> Def {
        Def::new(DefKind::StructVal { ty, args })
    }

    pub fn closure_value(ty: Type, args: Vec<Def>) -> Def {
        Def::new(DefKind::ClosureVal { ty, args })
    }

    pub fn definite_array(elem_ty: Type, args: Vec<Def>) -> Def {
        Def::new(DefKind::DefiniteArray { elem_ty, args })
    }

    pub fn indefinite_array(elem_ty: Type, dim: Def) -> Def {
        Def::new(DefKind::IndefiniteArray { elem_ty, dim })
    }
}
