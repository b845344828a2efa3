//! End-to-end scenarios exercising the builder/materialization/seal
//! pipeline together, one per canonical usage pattern.

use cps_ir::combinators;
use cps_ir::continuation;
use cps_ir::module::ModuleContext;
use cps_ir::types::{PrimTag, Type};
use cps_ir::Def;

fn in_temp_dir<R>(f: impl FnOnce() -> R) -> R {
    let dir = tempfile::tempdir().expect("tempdir");
    let previous = std::env::current_dir().expect("cwd");
    std::env::set_current_dir(dir.path()).expect("chdir into tempdir");
    let result = f();
    std::env::set_current_dir(previous).expect("chdir back");
    result
}

/// E1: an externally-linked `add(i32, i32) -> i32` function seals to a
/// document containing exactly one `external`-linked continuation and
/// one `arithop`.
#[test]
fn e1_external_add_function() {
    in_temp_dir(|| {
        let mut module = ModuleContext::open("e1");
        let i32_type = Type::scalar(PrimTag::Qs32);
        combinators::define_function(
            &mut module,
            "add",
            vec![i32_type.clone(), i32_type],
            Type::scalar(PrimTag::Qs32),
            |_mem, params| params[0].add(params[1].clone()),
        );
        let document = module.seal().expect("seal succeeds");

        let external = document
            .defs
            .iter()
            .find(|e| e.get("external") == Some(&serde_json::json!("add")));
        assert!(external.is_some(), "no externally-linked `add` continuation in {:?}", document.defs);

        let arith = document.defs.iter().find(|e| e["type"] == "arithop");
        assert!(arith.is_some());
        assert_eq!(arith.unwrap()["op"], "add");
    });
}

/// E2: a counted range loop builds exactly one intrinsic `branch`
/// continuation and applies it with both loop arms.
#[test]
fn e2_range_loop_uses_one_branch_intrinsic() {
    in_temp_dir(|| {
        let mut module = ModuleContext::open("e2");
        let mem_type = Type::memory();
        let entry_type = Type::function(vec![mem_type]);
        let entry = continuation::continuation(entry_type);
        let entry_mem = entry.params[0].clone();

        combinators::range(
            &mut module,
            &entry.continuation,
            entry_mem,
            0i32,
            10i32,
            1i32,
            |_module, body, mem, _i, next| {
                body.apply(next, vec![mem]);
            },
            |_module, _ret, _mem| {},
        );
        module.register(entry.continuation);
        let document = module.seal().expect("seal succeeds");

        let branches: Vec<_> = document
            .defs
            .iter()
            .filter(|e| e.get("intrinsic") == Some(&serde_json::json!("branch")))
            .collect();
        assert_eq!(branches.len(), 1, "expected exactly one branch intrinsic, got {:?}", branches);
    });
}

/// E3: a recursive struct type shares one name across its two
/// table entries (already unit-tested in `types::mod`; here checked
/// after a full module seal round-trip).
#[test]
fn e3_recursive_struct_round_trips_through_seal() {
    in_temp_dir(|| {
        let mut module = ModuleContext::open("e3");
        let list_ty = Type::struct_forward_decl("List");
        let ptr_to_list = Type::pointer(list_ty.clone());
        let i32_ty = Type::scalar(PrimTag::Qs32);
        list_ty.fill_fields(vec![("head".to_string(), i32_ty), ("tail".to_string(), ptr_to_list)]);

        let head = Def::top(list_ty.clone());
        module.register(head);
        list_ty.materialize(&mut module);
        let document = module.seal().expect("seal succeeds");

        let declarations: Vec<_> = document
            .type_table
            .iter()
            .filter(|e| e["type"] == "struct" && e["struct_name"] == "List")
            .collect();
        assert_eq!(declarations.len(), 2, "expected a declaration and a definition entry");
        let names: std::collections::HashSet<_> = declarations.iter().map(|e| &e["name"]).collect();
        assert_eq!(names.len(), 1, "declaration and definition must share one name");
    });
}

/// E4: `string("Hi")` emits a NUL-terminated `{72, 105, 0}` byte array
/// behind a global, bitcast to `ptr<indef_array<pu8>>`.
#[test]
fn e4_string_literal() {
    in_temp_dir(|| {
        let mut module = ModuleContext::open("e4");
        let literal = combinators::string("Hi");
        module.register(Def::top(Type::scalar(PrimTag::Bool))); // keep module non-empty if literal is unused downstream
        literal.materialize(&mut module);
        let document = module.seal().expect("seal succeeds");

        let bitcast = document.defs.iter().find(|e| e["type"] == "bitcast");
        assert!(bitcast.is_some());
        let global = document.defs.iter().find(|e| e["type"] == "global");
        assert!(global.is_some());
    });
}

/// E5: importing a sealed document recovers an internal-linkage
/// continuation's real type (not just the `fn()` fallback) and
/// produces no duplicate type-table entries.
#[test]
fn e5_import_recovers_internal_stub_type() {
    in_temp_dir(|| {
        let document_path = {
            let mut producer = ModuleContext::open("e5_producer");
            let i32_type = Type::scalar(PrimTag::Qs32);
            let mem_type = Type::memory();
            let fn_type = Type::function(vec![mem_type, i32_type]);
            let scope = continuation::continuation_internal(fn_type, "helper");
            scope.continuation.apply(scope.continuation.clone(), vec![]);
            producer.register(scope.continuation);
            producer.seal().expect("seal succeeds");
            std::path::PathBuf::from("e5_producer.thorin.json")
        };

        let mut importer = ModuleContext::open("e5_importer");
        importer.include_document(&document_path).expect("import succeeds");
        let helper = importer.lookup_imported("helper").expect("helper stub present");

        // The stub's `fn_type` must be the recovered `fn(mem, qs32)`
        // (arity 2), not the source project's `fn()` fallback (arity 0).
        let name = importer.add(&helper);
        let document = importer.serialize();
        let declaration = document
            .defs
            .iter()
            .find(|e| e["name"] == serde_json::json!(name.to_string()) && e.get("fn_type").is_some())
            .expect("continuation declaration entry present");
        let arity = declaration["arg_names"].as_array().expect("arg_names is an array").len();
        assert_eq!(arity, 2, "expected recovered fn_type arity 2 (mem, qs32), got {arity}");
    });
}

/// E6: mutating a sealed module, or applying a continuation twice, is
/// a hard abort rather than a recoverable error.
#[test]
#[should_panic(expected = "cannot accept further definitions")]
fn e6_add_after_seal_is_fatal() {
    in_temp_dir(|| {
        let mut module = ModuleContext::open("e6");
        module.seal().expect("seal succeeds");
        module.register(Def::top(Type::scalar(PrimTag::Bool)));
    });
}

#[test]
#[should_panic(expected = "already applied")]
fn e6_double_application_is_fatal() {
    let mem = Type::memory();
    let scope = continuation::continuation(Type::function(vec![mem]));
    scope.continuation.apply(scope.continuation.clone(), vec![]);
    scope.continuation.apply(scope.continuation.clone(), vec![]);
}
