//! Arithmetic, math, and comparison op builders (spec.md §4.2).

use super::operand::ArithOperand;
use super::{Def, DefKind};

macro_rules! arith_op {
    ($name:ident, $op:literal) => {
        pub fn $name(&self, rhs: impl Into<ArithOperand>) -> Def {
            Def::new(DefKind::ArithOp {
                op: $op,
                args: vec![self.clone(), rhs.into().0],
            })
        }
    };
}

macro_rules! cmp_op {
    ($name:ident, $op:literal) => {
        pub fn $name(&self, rhs: impl Into<ArithOperand>) -> Def {
            Def::new(DefKind::Cmp {
                op: $op,
                args: vec![self.clone(), rhs.into().0],
            })
        }
    };
}

macro_rules! math_op {
    ($name:ident, $op:literal) => {
        pub fn $name(&self) -> Def {
            Def::new(DefKind::MathOp {
                op: $op,
                args: vec![self.clone()],
            })
        }
    };
}

impl Def {
    arith_op!(add, "add");
    arith_op!(sub, "sub");
    arith_op!(mul, "mul");
    arith_op!(div, "div");
    arith_op!(rem, "rem");
    arith_op!(and, "and");
    arith_op!(or, "or");
    arith_op!(xor, "xor");
    arith_op!(shl, "shl");
    arith_op!(shr, "shr");

    cmp_op!(lt, "lt");
    cmp_op!(le, "le");
    cmp_op!(gt, "gt");
    cmp_op!(ge, "ge");
    cmp_op!(eq, "eq");
    cmp_op!(ne, "ne");

    math_op!(neg, "neg");
    math_op!(sqrt, "sqrt");
    math_op!(floor, "floor");
    math_op!(ceil, "ceil");

    /// Two-argument math op (`min`/`max`/`pow`, etc).
    pub fn math_op2(&self, op: &'static str, rhs: impl Into<ArithOperand>) -> Def {
        Def::new(DefKind::MathOp {
            op,
            args: vec![self.clone(), rhs.into().0],
        })
    }
}
