//! Variant injection/projection (spec.md §4.2 "Variant ops").

use super::{Def, DefKind};
use crate::types::Type;

impl Def {
    /// `variant(ty, value, index)`: injects `value` into discriminant
    /// `index` of variant type `ty`.
    pub fn variant(ty: Type, value: Def, index: u32) -> Def {
        Def::new(DefKind::Variant { ty, value, index })
    }

    /// `variantextract(value, index)`: projects discriminant `index`'s
    /// payload out of a variant value.
    pub fn variant_extract(value: Def, index: u32) -> Def {
        Def::new(DefKind::VariantExtract { value, index })
    }

    /// `variantindex(value)`: reads which discriminant is active.
    pub fn variant_index(value: Def) -> Def {
        Def::new(DefKind::VariantIndex { value })
    }
}
