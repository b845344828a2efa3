//! ContinuationBuilder (spec.md §4.3): continuations are the hardest
//! builder in the registry, because a continuation's parameter list
//! must be able to reference the continuation itself (self-recursive
//! calls) before the continuation has a name of its own.
//!
//! We solve the chicken-and-egg problem with [`Rc::new_cyclic`]: the
//! parameters are built from a [`Weak`] handle back to the
//! continuation while its own `Rc` is still being constructed, instead
//! of threading a name string through by hand the way the source
//! library's `ThorinParameter.parent` reference does.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::json;

use crate::defs::{Def, DefInner, DefKind};
use crate::module::ModuleContext;
use crate::names::{entry_name, NameCache};
use crate::types::{PrimTag, Type};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Linkage {
    None,
    External,
    Internal,
    Intrinsic,
}

enum Filter {
    All(bool),
    Explicit(Def),
}

struct Application {
    target: Def,
    args: Vec<Def>,
}

pub(crate) struct ContinuationData {
    fn_type: Type,
    linkage: Linkage,
    link_name: Option<String>,
    parameters: Vec<Def>,
    filter: RefCell<Option<Filter>>,
    application: RefCell<Option<Application>>,
}

impl ContinuationData {
    /// The materialization protocol (spec.md §4.3 steps 1-5): reserve
    /// name+index before recursing into the type/parameters so a
    /// self-call inside `application` resolves back to this same name;
    /// emit the declaration entry; optionally emit filter, then a
    /// second entry sharing the name for the application.
    pub(crate) fn materialize(&self, this: &Def, module: &mut ModuleContext) -> Rc<str> {
        let index = module.next_def_index();
        let name = entry_name("continuation", index);
        this.0.name.reserve(name.clone());
        log::trace!("materializing continuation `{name}`");

        let fn_type = self.fn_type.materialize(module);
        let arg_names: Vec<Rc<str>> = self
            .parameters
            .iter()
            .map(|p| p.materialize(module))
            .collect();

        let mut decl = json!({
            "type": "continuation",
            "name": name,
            "fn_type": fn_type,
            "arg_names": arg_names,
        });
        match (&self.linkage, &self.link_name) {
            (Linkage::None, _) => {}
            (Linkage::External, Some(n)) => decl["external"] = json!(n),
            (Linkage::Internal, Some(n)) => decl["internal"] = json!(n),
            (Linkage::Intrinsic, Some(n)) => decl["intrinsic"] = json!(n),
            _ => unreachable!("non-None linkage always carries a link_name"),
        }
        module.push_def_entry(decl);

        let filter_name = self.filter.borrow().as_ref().map(|f| match f {
            Filter::All(value) => {
                let bool_ty = Type::scalar(PrimTag::Bool);
                let consts: Vec<Def> = (0..self.parameters.len())
                    .map(|_| Def::constant(bool_ty.clone(), *value))
                    .collect();
                Def::filter(consts).materialize(module)
            }
            Filter::Explicit(def) => def.materialize(module),
        });

        if let Some(app) = self.application.borrow().as_ref() {
            let target = app.target.materialize(module);
            let args: Vec<Rc<str>> = app.args.iter().map(|a| a.materialize(module)).collect();
            let mut app_entry = json!({
                "type": "continuation",
                "name": name,
                "app": {"target": target, "args": args},
            });
            if let Some(filter_name) = filter_name {
                app_entry["filter"] = json!(filter_name);
            }
            module.push_def_entry(app_entry);
        }

        name
    }
}

/// A handle returned while constructing a continuation: the
/// continuation itself plus its already-built parameter defs, mirroring
/// the source library's `with builder.continuation(ty) as (k, p0, p1):`
/// idiom without relying on a context manager.
pub struct ContinuationScope {
    pub continuation: Def,
    pub params: Vec<Def>,
}

fn build(fn_type: Type, linkage: Linkage, link_name: Option<String>) -> ContinuationScope {
    let arity = fn_type.arity();
    let def = Rc::new_cyclic(|weak: &Weak<DefInner>| {
        let parameters: Vec<Def> = (0..arity)
            .map(|index| {
                Def::from_inner(Rc::new(DefInner {
                    name: NameCache::new(),
                    kind: DefKind::Parameter {
                        parent: weak.clone(),
                        index,
                    },
                }))
            })
            .collect();
        DefInner {
            name: NameCache::new(),
            kind: DefKind::Continuation(ContinuationData {
                fn_type,
                linkage,
                link_name,
                parameters,
                filter: RefCell::new(None),
                application: RefCell::new(None),
            }),
        }
    });
    let continuation = Def::from_inner(def);
    let params = match &continuation.0.kind {
        DefKind::Continuation(data) => data.parameters.clone(),
        _ => unreachable!(),
    };
    ContinuationScope { continuation, params }
}

/// `continuation(type)`: a plain, non-exported continuation.
pub fn continuation(fn_type: Type) -> ContinuationScope {
    build(fn_type, Linkage::None, None)
}

/// `continuation(type, external=name)`: an externally-callable entry
/// point (spec.md §4.3 "linkage").
pub fn continuation_external(fn_type: Type, name: impl Into<String>) -> ContinuationScope {
    build(fn_type, Linkage::External, Some(name.into()))
}

/// `continuation(type, internal=name)`: a named continuation an
/// importer can look up via `lookupImported`.
pub fn continuation_internal(fn_type: Type, name: impl Into<String>) -> ContinuationScope {
    build(fn_type, Linkage::Internal, Some(name.into()))
}

/// `continuation(type, intrinsic=name)`: a backend-recognized
/// intrinsic, e.g. the `"branch"` control-flow primitive.
pub fn continuation_intrinsic(fn_type: Type, name: impl Into<String>) -> ContinuationScope {
    build(fn_type, Linkage::Intrinsic, Some(name.into()))
}

impl Def {
    /// Sets this continuation's partial-evaluation filter to a uniform
    /// `true`/`false` across every parameter. Panics if already set or
    /// if `self` is not a continuation.
    pub fn set_filter_all(&self, value: bool) {
        self.with_continuation_data(|data| {
            let mut slot = data.filter.borrow_mut();
            assert!(slot.is_none(), "continuation filter already set");
            *slot = Some(Filter::All(value));
        });
    }

    /// Sets this continuation's filter to an explicit per-parameter
    /// `filter` def. Panics if already set.
    pub fn set_filter(&self, filter: Def) {
        self.with_continuation_data(|data| {
            let mut slot = data.filter.borrow_mut();
            assert!(slot.is_none(), "continuation filter already set");
            *slot = Some(Filter::Explicit(filter));
        });
    }

    /// `continuation(target, *args)`: the one-shot terminator
    /// application. Panics if this continuation has already been
    /// applied (spec.md §7 "double continuation application").
    pub fn apply(&self, target: Def, args: Vec<Def>) {
        self.with_continuation_data(|data| {
            let mut slot = data.application.borrow_mut();
            assert!(slot.is_none(), "continuation already applied");
            *slot = Some(Application { target, args });
        });
    }

    fn with_continuation_data<R>(&self, f: impl FnOnce(&ContinuationData) -> R) -> R {
        match &self.0.kind {
            DefKind::Continuation(data) => f(data),
            _ => panic!("not a continuation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleContext;

    #[test]
    fn self_calling_continuation_shares_one_name() {
        let mut module = ModuleContext::open("t");
        let mem = Type::memory();
        let scope = continuation(Type::function(vec![mem]));
        let k = scope.continuation.clone();
        // Self-recursive: the loop continuation calls itself.
        k.apply(k.clone(), vec![scope.params[0].clone()]);

        let name = k.materialize(&mut module);
        let decl = module
            .defs
            .iter()
            .find(|e| e["name"] == serde_json::json!(name.to_string()) && e.get("fn_type").is_some())
            .expect("declaration entry present");
        assert!(decl.get("app").is_none());

        let app = module
            .defs
            .iter()
            .find(|e| e["name"] == serde_json::json!(name.to_string()) && e.get("app").is_some())
            .expect("application entry present");
        assert_eq!(app["app"]["target"], serde_json::json!(name.to_string()));
    }

    #[test]
    #[should_panic(expected = "already applied")]
    fn double_application_is_fatal() {
        let mem = Type::memory();
        let scope = continuation(Type::function(vec![mem]));
        let k = scope.continuation.clone();
        k.apply(k.clone(), vec![]);
        k.apply(k.clone(), vec![]);
    }
}
