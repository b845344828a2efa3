//! Inline assembly escape hatch (spec.md §4.2 "Assembly").

use super::{Def, DefKind};
use crate::types::Type;

impl Def {
    #[allow(clippy::too_many_arguments)]
    pub fn assembly(
        ty: Type,
        inputs: Vec<Def>,
        template: impl Into<String>,
        input_constraints: Vec<String>,
        output_constraints: Vec<String>,
        clobbers: Vec<String>,
    ) -> Def {
        Def::new(DefKind::Assembly {
            ty,
            inputs,
            template: template.into(),
            input_constraints,
            output_constraints,
            clobbers,
        })
    }
}
