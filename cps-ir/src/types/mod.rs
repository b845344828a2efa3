//! TypeRegistry (spec.md §4.1): builders for IR types, lazy naming, and
//! emission into the module's type table.

mod prim;
pub mod reconstruct;

pub use prim::PrimTag;

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use crate::module::ModuleContext;
use crate::names::{entry_name, NameCache};

/// `(field_name, field_type)` pairs for a struct/variant, populated
/// up-front when building and filled in later (once) when reconstructed
/// from an imported forward declaration (spec.md §4.6).
pub type Fields = Rc<RefCell<Option<Vec<(String, Type)>>>>;

#[derive(Debug)]
enum TypeKind {
    Primitive {
        tag: PrimTag,
        length: u32,
    },
    Pointer {
        pointee: Type,
        length: u32,
        device: Option<String>,
        addrspace: Option<String>,
    },
    Memory,
    Frame,
    Bottom,
    Function {
        args: Vec<Type>,
    },
    Closure {
        args: Vec<Type>,
    },
    Tuple {
        args: Vec<Type>,
    },
    Struct {
        struct_name: String,
        fields: Fields,
    },
    Variant {
        variant_name: String,
        fields: Fields,
    },
    DefiniteArray {
        elem: Type,
        length: u64,
    },
    IndefiniteArray {
        elem: Type,
    },
}

#[derive(Debug)]
struct TypeInner {
    name: NameCache,
    kind: TypeKind,
}

/// An opaque, cheaply-cloned handle to a (possibly not-yet-emitted) IR
/// type node. Equality is reference identity, matching spec.md §7
/// ("equality must be reference-based").
#[derive(Debug, Clone)]
pub struct Type(Rc<TypeInner>);

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for Type {}

impl Type {
    fn new(kind: TypeKind) -> Self {
        Type(Rc::new(TypeInner {
            name: NameCache::new(),
            kind,
        }))
    }

    // ---- constructors (one per type variant) ----

    pub fn primitive(tag: PrimTag, length: u32) -> Self {
        assert!(length >= 1, "SIMD lane length must be >= 1");
        Type::new(TypeKind::Primitive { tag, length })
    }

    pub fn scalar(tag: PrimTag) -> Self {
        Type::primitive(tag, 1)
    }

    pub fn bool_() -> Self {
        Type::scalar(PrimTag::Bool)
    }

    pub fn pointer(pointee: Type) -> Self {
        Type::new(TypeKind::Pointer {
            pointee,
            length: 1,
            device: None,
            addrspace: None,
        })
    }

    pub fn pointer_with(
        pointee: Type,
        length: u32,
        device: Option<String>,
        addrspace: Option<String>,
    ) -> Self {
        assert!(length >= 1, "pointer lane length must be >= 1");
        Type::new(TypeKind::Pointer {
            pointee,
            length,
            device,
            addrspace,
        })
    }

    pub fn memory() -> Self {
        Type::new(TypeKind::Memory)
    }

    pub fn frame() -> Self {
        Type::new(TypeKind::Frame)
    }

    pub fn bottom() -> Self {
        Type::new(TypeKind::Bottom)
    }

    /// A bare function type: `fn(args...)`, no implicit return continuation.
    pub fn function(args: Vec<Type>) -> Self {
        Type::new(TypeKind::Function { args })
    }

    /// `fn(args..., fn(mem, ret))` — "returning `ret`", CPS convention.
    pub fn function_returning(mut args: Vec<Type>, ret: Type) -> Self {
        let mem = Type::memory();
        args.push(Type::function(vec![mem, ret]));
        Type::new(TypeKind::Function { args })
    }

    /// `fn(args..., fn(mem))` — "returning void".
    pub fn function_returning_void(mut args: Vec<Type>) -> Self {
        let mem = Type::memory();
        args.push(Type::function(vec![mem]));
        Type::new(TypeKind::Function { args })
    }

    /// `fn(args...)` with no appended return continuation — "no-return".
    pub fn function_no_return(args: Vec<Type>) -> Self {
        Type::function(args)
    }

    pub fn closure(args: Vec<Type>) -> Self {
        Type::new(TypeKind::Closure { args })
    }

    pub fn tuple(args: Vec<Type>) -> Self {
        Type::new(TypeKind::Tuple { args })
    }

    pub fn struct_(struct_name: impl Into<String>, fields: Vec<(String, Type)>) -> Self {
        Type::new(TypeKind::Struct {
            struct_name: struct_name.into(),
            fields: Rc::new(RefCell::new(Some(fields))),
        })
    }

    pub fn variant(variant_name: impl Into<String>, fields: Vec<(String, Type)>) -> Self {
        Type::new(TypeKind::Variant {
            variant_name: variant_name.into(),
            fields: Rc::new(RefCell::new(Some(fields))),
        })
    }

    pub fn definite_array(elem: Type, length: u64) -> Self {
        Type::new(TypeKind::DefiniteArray { elem, length })
    }

    pub fn indefinite_array(elem: Type) -> Self {
        Type::new(TypeKind::IndefiniteArray { elem })
    }

    /// Forward-declares a struct with no field list yet. Used by the
    /// import path to support recursive references before the defining
    /// entry has been read (spec.md §4.6), and by callers building a
    /// genuinely self-referential struct (e.g. `List { head, tail:
    /// ptr<List> }`, spec.md §4.1 E3): create the handle, build field
    /// types that reference it (directly or through `Type::pointer`),
    /// then call [`Type::fill_fields`] once the field list is known.
    pub fn struct_forward_decl(struct_name: impl Into<String>) -> Self {
        Type::new(TypeKind::Struct {
            struct_name: struct_name.into(),
            fields: Rc::new(RefCell::new(None)),
        })
    }

    /// The `Type::variant` counterpart to [`Type::struct_forward_decl`].
    pub fn variant_forward_decl(variant_name: impl Into<String>) -> Self {
        Type::new(TypeKind::Variant {
            variant_name: variant_name.into(),
            fields: Rc::new(RefCell::new(None)),
        })
    }

    /// Resolves a struct/variant handle created with
    /// [`Type::struct_forward_decl`] or [`Type::variant_forward_decl`].
    /// Panics if `self` isn't an aggregate type, or if its fields were
    /// already resolved (spec.md §7: sealed/already-bound state is a
    /// hard abort, not a recoverable error).
    pub fn fill_fields(&self, resolved: Vec<(String, Type)>) {
        match &self.0.kind {
            TypeKind::Struct { fields, .. } | TypeKind::Variant { fields, .. } => {
                let mut slot = fields.borrow_mut();
                assert!(slot.is_none(), "struct/variant fields already resolved");
                *slot = Some(resolved);
            }
            _ => panic!("fill_fields called on a non-aggregate type"),
        }
    }

    pub fn cached_name(&self) -> Option<Rc<str>> {
        self.0.name.get()
    }

    /// Number of parameters a continuation built with this type must
    /// have. Panics if `self` isn't a function type — a continuation's
    /// type always is one (spec.md §4.3).
    pub(crate) fn arity(&self) -> usize {
        match &self.0.kind {
            TypeKind::Function { args } => args.len(),
            _ => panic!("a continuation's type must be a function type"),
        }
    }

    /// `materialize(module)`: emits dependency types first, then appends
    /// one entry (or, for struct/variant, a declaration+definition pair
    /// sharing one name) and caches the assigned name.
    pub fn materialize(&self, module: &mut ModuleContext) -> Rc<str> {
        if let Some(name) = self.0.name.get() {
            return name;
        }
        match &self.0.kind {
            TypeKind::Primitive { tag, length } => {
                let index = module.next_type_index();
                let name = entry_name("prim", index);
                module.push_type_entry(json!({
                    "type": "prim", "name": name, "tag": tag.as_str(), "length": length,
                }));
                self.0.name.reserve(name.clone());
                name
            }
            TypeKind::Pointer {
                pointee,
                length,
                device,
                addrspace,
            } => {
                let pointee_name = pointee.materialize(module);
                let index = module.next_type_index();
                let name = entry_name("ptr", index);
                let mut entry = json!({
                    "type": "ptr", "name": name, "length": length, "args": [pointee_name],
                });
                if let Some(device) = device {
                    entry["device"] = json!(device);
                }
                if let Some(addrspace) = addrspace {
                    entry["addrspace"] = json!(addrspace);
                }
                module.push_type_entry(entry);
                self.0.name.reserve(name.clone());
                name
            }
            TypeKind::Memory => self.emit_nullary(module, "mem"),
            TypeKind::Frame => self.emit_nullary(module, "frame"),
            TypeKind::Bottom => self.emit_nullary(module, "bottom"),
            TypeKind::Function { args } => self.emit_arglist(module, "fn", "function", args),
            TypeKind::Closure { args } => self.emit_arglist(module, "closure", "closure", args),
            TypeKind::Tuple { args } => self.emit_arglist(module, "tuple", "tuple", args),
            TypeKind::DefiniteArray { elem, length } => {
                let elem_name = elem.materialize(module);
                let index = module.next_type_index();
                let name = entry_name("def_array", index);
                module.push_type_entry(json!({
                    "type": "def_array", "name": name, "length": length, "args": [elem_name],
                }));
                self.0.name.reserve(name.clone());
                name
            }
            TypeKind::IndefiniteArray { elem } => {
                let elem_name = elem.materialize(module);
                let index = module.next_type_index();
                let name = entry_name("indef_array", index);
                module.push_type_entry(json!({
                    "type": "indef_array", "name": name, "args": [elem_name],
                }));
                self.0.name.reserve(name.clone());
                name
            }
            TypeKind::Struct {
                struct_name,
                fields,
            } => self.emit_aggregate(module, "struct", struct_name, fields),
            TypeKind::Variant {
                variant_name,
                fields,
            } => self.emit_aggregate(module, "variant", variant_name, fields),
        }
    }

    fn emit_nullary(&self, module: &mut ModuleContext, kind: &str) -> Rc<str> {
        let index = module.next_type_index();
        let name = entry_name(kind, index);
        module.push_type_entry(json!({"type": kind, "name": name}));
        self.0.name.reserve(name.clone());
        name
    }

    fn emit_arglist(
        &self,
        module: &mut ModuleContext,
        name_kind: &str,
        wire_kind: &str,
        args: &[Type],
    ) -> Rc<str> {
        let arg_names: Vec<Rc<str>> = args.iter().map(|a| a.materialize(module)).collect();
        let index = module.next_type_index();
        let name = entry_name(name_kind, index);
        module.push_type_entry(json!({"type": wire_kind, "name": name, "args": arg_names}));
        self.0.name.reserve(name.clone());
        name
    }

    /// Two-phase struct/variant emission (spec.md §4.1): reserve the
    /// name and push a forward-declaration entry *before* materializing
    /// field types, so a field referencing this type by name (e.g. a
    /// pointer-to-self) resolves correctly; then push the definition.
    fn emit_aggregate(
        &self,
        module: &mut ModuleContext,
        wire_kind: &str,
        nominal_name: &str,
        fields: &Fields,
    ) -> Rc<str> {
        let arg_names: Vec<String> = {
            let borrowed = fields.borrow();
            let fields = borrowed
                .as_ref()
                .unwrap_or_else(|| panic!("{wire_kind} `{nominal_name}` emitted with no field list"));
            fields.iter().map(|(n, _)| n.clone()).collect()
        };

        let index = module.next_type_index();
        let name = entry_name(wire_kind, index);
        self.0.name.reserve(name.clone());

        let nominal_key = if wire_kind == "struct" {
            "struct_name"
        } else {
            "variant_name"
        };
        module.push_type_entry(json!({
            "type": wire_kind, "name": name, nominal_key: nominal_name, "arg_names": arg_names,
        }));

        let arg_types: Vec<Rc<str>> = {
            let borrowed = fields.borrow();
            let fields = borrowed.as_ref().expect("checked above");
            fields
                .iter()
                .map(|(_, ty)| ty.materialize(module))
                .collect()
        };

        module.push_type_entry(json!({
            "type": wire_kind, "name": name, nominal_key: nominal_name,
            "arg_names": arg_names, "args": arg_types,
        }));

        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_materializes_once() {
        let mut module = ModuleContext::open("t");
        let i32_ty = Type::scalar(PrimTag::Qs32);
        let first = i32_ty.materialize(&mut module);
        let second = i32_ty.materialize(&mut module);
        assert_eq!(first, second);
        assert_eq!(module.type_table.len(), 1);
    }

    #[test]
    fn recursive_struct_shares_one_name_across_two_entries() {
        let mut module = ModuleContext::open("t");
        let list_ty = Type::struct_forward_decl("List");
        let ptr_to_list = Type::pointer(list_ty.clone());
        list_ty.fill_fields(vec![
            ("head".to_string(), Type::scalar(PrimTag::Qs32)),
            ("tail".to_string(), ptr_to_list),
        ]);

        let name = list_ty.materialize(&mut module);
        let decl = &module.type_table[0];
        assert_eq!(decl["name"], json!(name.to_string()));
        assert_eq!(decl["arg_names"], json!(["head", "tail"]));
        assert!(decl.get("args").is_none());

        let defn = module
            .type_table
            .iter()
            .rev()
            .find(|e| e["name"] == json!(name.to_string()) && e.get("args").is_some())
            .expect("definition entry present");
        assert_eq!(defn["args"].as_array().unwrap().len(), 2);
    }

    #[test]
    #[should_panic(expected = "emitted with no field list")]
    fn struct_without_fields_is_fatal() {
        let mut module = ModuleContext::open("t");
        let incomplete = Type::struct_forward_decl("Incomplete");
        incomplete.materialize(&mut module);
    }
}
