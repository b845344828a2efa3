//! DefRegistry (spec.md §4.2): builders for IR values/definitions.
//!
//! Every def kind mirrors the type-handle pattern in [`crate::types`]:
//! lazy, reference-identity, cached, emits exactly one entry (or, for
//! continuations, a declaration+application pair) on first
//! materialization.

mod aggregate;
mod arith;
mod assembly;
mod cast;
mod constant;
mod global;
mod memory;
mod meta;
mod operand;
mod select_filter;
mod variant;

pub use operand::{ArithOperand, IndexOperand, StoreOperand};

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use serde_json::{json, Value};

use crate::continuation::ContinuationData;
use crate::module::ModuleContext;
use crate::names::{entry_name, parameter_name, NameCache};
use crate::types::Type;

pub(crate) enum DefKind {
    Constant {
        ty: Type,
        value: Value,
    },
    Top {
        ty: Type,
    },
    Bottom {
        ty: Type,
    },
    ArithOp {
        op: &'static str,
        args: Vec<Def>,
    },
    MathOp {
        op: &'static str,
        args: Vec<Def>,
    },
    Cmp {
        op: &'static str,
        args: Vec<Def>,
    },
    Cast {
        source: Def,
        target: Type,
    },
    Bitcast {
        source: Def,
        target: Type,
    },
    Extract {
        aggregate: Def,
        index: Def,
    },
    Insert {
        args: Vec<Def>,
    },
    Lea {
        args: Vec<Def>,
    },
    Tuple {
        args: Vec<Def>,
    },
    Vector {
        args: Vec<Def>,
    },
    StructVal {
        ty: Type,
        args: Vec<Def>,
    },
    ClosureVal {
        ty: Type,
        args: Vec<Def>,
    },
    DefiniteArray {
        elem_ty: Type,
        args: Vec<Def>,
    },
    IndefiniteArray {
        elem_ty: Type,
        dim: Def,
    },
    Load {
        mem: Def,
        ptr: Def,
    },
    Store {
        mem: Def,
        ptr: Def,
        value: Def,
    },
    Enter {
        mem: Def,
    },
    Slot {
        frame: Def,
        ty: Type,
    },
    Alloc {
        ty: Type,
        args: Vec<Def>,
    },
    Run,
    Hlt {
        target: Def,
    },
    Known {
        value: Def,
    },
    Sizeof {
        ty: Type,
    },
    Alignof {
        ty: Type,
    },
    Select {
        args: Vec<Def>,
    },
    Filter {
        args: Vec<Def>,
    },
    Variant {
        ty: Type,
        value: Def,
        index: u32,
    },
    VariantExtract {
        value: Def,
        index: u32,
    },
    VariantIndex {
        value: Def,
    },
    Global {
        init: Def,
        mutable: bool,
        external: Option<String>,
    },
    Assembly {
        ty: Type,
        inputs: Vec<Def>,
        template: String,
        input_constraints: Vec<String>,
        output_constraints: Vec<String>,
        clobbers: Vec<String>,
    },
    /// Does not emit its own table entry — exists purely as a derived
    /// reference string `"<parent>.<index>"` (spec.md §4.3 step 2).
    Parameter {
        parent: Weak<DefInner>,
        index: usize,
    },
    Continuation(ContinuationData),
}

pub(crate) struct DefInner {
    pub(crate) name: NameCache,
    pub(crate) kind: DefKind,
}

/// An opaque handle to a (possibly not-yet-emitted) IR definition.
/// Reference-identity equality only (spec.md §7); deliberately no
/// `impl From<Def> for bool` anywhere in this crate, so accidental
/// truthiness checks on a handle are a compile error rather than the
/// runtime error the source language has to raise.
#[derive(Clone)]
pub struct Def(pub(crate) Rc<DefInner>);

impl std::fmt::Debug for Def {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.name.get() {
            Some(name) => write!(f, "Def({name})"),
            None => write!(f, "Def(<unmaterialized>)"),
        }
    }
}

impl PartialEq for Def {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for Def {}

impl Def {
    pub(crate) fn new(kind: DefKind) -> Self {
        Def(Rc::new(DefInner {
            name: NameCache::new(),
            kind,
        }))
    }

    pub(crate) fn from_inner(inner: Rc<DefInner>) -> Self {
        Def(inner)
    }

    pub fn cached_name(&self) -> Option<Rc<str>> {
        self.0.name.get()
    }

    /// `k.get(module)`: the materialization protocol (spec.md §4.2 and
    /// §4.3). Non-continuation, non-parameter kinds share one shape:
    /// materialize dependencies, append one entry, cache the name.
    pub fn materialize(&self, module: &mut ModuleContext) -> Rc<str> {
        if let Some(name) = self.0.name.get() {
            return name;
        }
        match &self.0.kind {
            DefKind::Parameter { parent, index } => {
                let parent = Def::from_inner(
                    parent
                        .upgrade()
                        .unwrap_or_else(|| panic!("parameter's continuation has been dropped")),
                );
                let parent_name = parent.materialize(module);
                parameter_name(&parent_name, *index)
            }
            DefKind::Continuation(data) => data.materialize(self, module),
            _ => self.materialize_simple(module),
        }
    }

    fn materialize_simple(&self, module: &mut ModuleContext) -> Rc<str> {
        let entry = match &self.0.kind {
            DefKind::Constant { ty, value } => {
                let ty = ty.materialize(module);
                Some(("const", json!({"const_type": ty, "value": value})))
            }
            DefKind::Top { ty } => {
                let ty = ty.materialize(module);
                Some(("top", json!({"const_type": ty})))
            }
            DefKind::Bottom { ty } => {
                let ty = ty.materialize(module);
                Some(("bottom", json!({"const_type": ty})))
            }
            DefKind::ArithOp { op, args } => {
                let args = materialize_all(args, module);
                Some(("arithop", json!({"op": op, "args": args})))
            }
            DefKind::MathOp { op, args } => {
                let args = materialize_all(args, module);
                Some(("mathop", json!({"op": op, "args": args})))
            }
            DefKind::Cmp { op, args } => {
                let args = materialize_all(args, module);
                Some(("cmp", json!({"op": op, "args": args})))
            }
            DefKind::Cast { source, target } => {
                let source = source.materialize(module);
                let target = target.materialize(module);
                Some(("cast", json!({"source": source, "target_type": target})))
            }
            DefKind::Bitcast { source, target } => {
                let source = source.materialize(module);
                let target = target.materialize(module);
                Some(("bitcast", json!({"source": source, "target_type": target})))
            }
            DefKind::Extract { aggregate, index } => {
                let aggregate = aggregate.materialize(module);
                let index = index.materialize(module);
                Some(("extract", json!({"args": [aggregate, index]})))
            }
            DefKind::Insert { args } => {
                let args = materialize_all(args, module);
                Some(("insert", json!({"args": args})))
            }
            DefKind::Lea { args } => {
                let args = materialize_all(args, module);
                Some(("lea", json!({"args": args})))
            }
            DefKind::Tuple { args } => {
                let args = materialize_all(args, module);
                Some(("tuple", json!({"args": args})))
            }
            DefKind::Vector { args } => {
                let args = materialize_all(args, module);
                Some(("vector", json!({"args": args})))
            }
            DefKind::StructVal { ty, args } => {
                let ty = ty.materialize(module);
                let args = materialize_all(args, module);
                Some(("struct", json!({"struct_type": ty, "args": args})))
            }
            DefKind::ClosureVal { ty, args } => {
                let ty = ty.materialize(module);
                let args = materialize_all(args, module);
                Some(("closure", json!({"closure_type": ty, "args": args})))
            }
            DefKind::DefiniteArray { elem_ty, args } => {
                let elem_ty = elem_ty.materialize(module);
                let args = materialize_all(args, module);
                Some(("def_array", json!({"elem_type": elem_ty, "args": args})))
            }
            DefKind::IndefiniteArray { elem_ty, dim } => {
                let elem_ty = elem_ty.materialize(module);
                let dim = dim.materialize(module);
                Some(("indef_array", json!({"elem_type": elem_ty, "dim": dim})))
            }
            DefKind::Load { mem, ptr } => {
                let mem = mem.materialize(module);
                let ptr = ptr.materialize(module);
                Some(("load", json!({"args": [mem, ptr]})))
            }
            DefKind::Store { mem, ptr, value } => {
                let mem = mem.materialize(module);
                let ptr = ptr.materialize(module);
                let value = value.materialize(module);
                Some(("store", json!({"args": [mem, ptr, value]})))
            }
            DefKind::Enter { mem } => {
                let mem = mem.materialize(module);
                Some(("enter", json!({"mem": mem})))
            }
            DefKind::Slot { frame, ty } => {
                let frame = frame.materialize(module);
                let ty = ty.materialize(module);
                Some(("slot", json!({"frame": frame, "target_type": ty})))
            }
            DefKind::Alloc { ty, args } => {
                let ty = ty.materialize(module);
                let args = materialize_all(args, module);
                Some(("alloc", json!({"target_type": ty, "args": args})))
            }
            DefKind::Run => Some(("run", json!({}))),
            DefKind::Hlt { target } => {
                let target = target.materialize(module);
                Some(("hlt", json!({"target": target})))
            }
            DefKind::Known { value } => {
                let value = value.materialize(module);
                Some(("known", json!({"def": value})))
            }
            DefKind::Sizeof { ty } => {
                let ty = ty.materialize(module);
                Some(("sizeof", json!({"target_type": ty})))
            }
            DefKind::Alignof { ty } => {
                let ty = ty.materialize(module);
                Some(("alignof", json!({"target_type": ty})))
            }
            DefKind::Select { args } => {
                let args = materialize_all(args, module);
                Some(("select", json!({"args": args})))
            }
            DefKind::Filter { args } => {
                let args = materialize_all(args, module);
                Some(("filter", json!({"args": args})))
            }
            DefKind::Variant { ty, value, index } => {
                let ty = ty.materialize(module);
                let value = value.materialize(module);
                Some((
                    "variant",
                    json!({"variant_type": ty, "value": value, "index": index}),
                ))
            }
            DefKind::VariantExtract { value, index } => {
                let value = value.materialize(module);
                Some(("variantextract", json!({"value": value, "index": index})))
            }
            DefKind::VariantIndex { value } => {
                let value = value.materialize(module);
                Some(("variantindex", json!({"value": value})))
            }
            DefKind::Global {
                init,
                mutable,
                external,
            } => {
                let init = init.materialize(module);
                let mut body = json!({"mutable": mutable, "init": init});
                if let Some(external) = external {
                    body["external"] = json!(external);
                }
                Some(("global", body))
            }
            DefKind::Assembly {
                ty,
                inputs,
                template,
                input_constraints,
                output_constraints,
                clobbers,
            } => {
                let ty = ty.materialize(module);
                let inputs = materialize_all(inputs, module);
                Some((
                    "assembly",
                    json!({
                        "asm_type": ty,
                        "inputs": inputs,
                        "asm_template": template,
                        "input_constraints": input_constraints,
                        "output_constraints": output_constraints,
                        "clobbers": clobbers,
                    }),
                ))
            }
            DefKind::Parameter { .. } | DefKind::Continuation(_) => unreachable!(
                "handled in materialize() before dispatching to materialize_simple"
            ),
        };

        let (wire_kind, mut body) = entry.expect("every non-continuation, non-parameter kind produces an entry");
        let index = module.next_def_index();
        let name = entry_name(wire_kind, index);
        body["type"] = json!(wire_kind);
        body["name"] = json!(name);
        module.push_def_entry(body);
        self.0.name.reserve(name.clone());
        name
    }
}

pub(crate) fn materialize_all(defs: &[Def], module: &mut ModuleContext) -> Vec<Rc<str>> {
    defs.iter().map(|d| d.materialize(module)).collect()
}

/// Used by [`crate::import`]: internal-linkage continuation stubs keyed
/// by their link name (spec.md §4.6 step 2).
pub type ImportedDefs = HashMap<String, Def>;
