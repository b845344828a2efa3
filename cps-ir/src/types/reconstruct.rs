//! Reconstructing live `Type` handles from a serialized type table
//! (spec.md §4.6 step 1).

use std::collections::HashMap;
use std::str::FromStr;

use serde_json::Value;

use super::{PrimTag, Type};
use crate::error::{CoreError, Result};

fn field(entry: &Value, kind: &str, field: &str) -> Result<Value> {
    entry
        .get(field)
        .cloned()
        .ok_or_else(|| CoreError::MissingField {
            kind: kind.to_string(),
            field: field.to_string(),
        })
}

fn resolve<'a>(
    mapping: &'a HashMap<String, Type>,
    name: &str,
) -> Result<&'a Type> {
    mapping
        .get(name)
        .ok_or_else(|| CoreError::UnknownTypeName(name.to_string()))
}

fn resolve_args(mapping: &HashMap<String, Type>, entry: &Value, kind: &str) -> Result<Vec<Type>> {
    let names = field(entry, kind, "args")?;
    let names = names.as_array().ok_or_else(|| CoreError::MissingField {
        kind: kind.to_string(),
        field: "args".to_string(),
    })?;
    names
        .iter()
        .map(|v| {
            let name = v.as_str().ok_or_else(|| CoreError::MissingField {
                kind: kind.to_string(),
                field: "args[]".to_string(),
            })?;
            Ok(resolve(mapping, name)?.clone())
        })
        .collect()
}

/// Reconstructs one type-table entry, mutating `mapping` in place.
///
/// Struct/variant definition entries (the second of the two-phase pair)
/// mutate the handle already installed by the earlier declaration entry
/// rather than creating a new one, so pointers recorded against the
/// declaration's name keep working (spec.md §4.6).
pub fn reconstruct_entry(mapping: &mut HashMap<String, Type>, entry: &Value) -> Result<()> {
    let kind = entry
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| CoreError::MissingField {
            kind: "<type entry>".to_string(),
            field: "type".to_string(),
        })?
        .to_string();
    let name = field(entry, &kind, "name")?
        .as_str()
        .ok_or_else(|| CoreError::MissingField {
            kind: kind.clone(),
            field: "name".to_string(),
        })?
        .to_string();

    let ty = match kind.as_str() {
        "prim" => {
            let tag = field(entry, &kind, "tag")?;
            let tag = tag.as_str().ok_or_else(|| CoreError::MissingField {
                kind: kind.clone(),
                field: "tag".to_string(),
            })?;
            let tag = PrimTag::from_str(tag).map_err(|_| CoreError::MissingField {
                kind: kind.clone(),
                field: "tag".to_string(),
            })?;
            // "length" is the standardized spelling; accept the original's
            // "lenght" typo for documents produced by the buggy source
            // (spec.md §9 open question).
            let length = entry
                .get("length")
                .or_else(|| entry.get("lenght"))
                .and_then(Value::as_u64)
                .unwrap_or(1) as u32;
            Type::primitive(tag, length)
        }
        "ptr" => {
            let args = resolve_args(mapping, entry, &kind)?;
            let pointee = args.into_iter().next().ok_or_else(|| CoreError::MissingField {
                kind: kind.clone(),
                field: "args[0]".to_string(),
            })?;
            let length = entry.get("length").and_then(Value::as_u64).unwrap_or(1) as u32;
            let device = entry.get("device").and_then(Value::as_str).map(String::from);
            let addrspace = entry
                .get("addrspace")
                .and_then(Value::as_str)
                .map(String::from);
            Type::pointer_with(pointee, length, device, addrspace)
        }
        "mem" => Type::memory(),
        "frame" => Type::frame(),
        "bottom" => Type::bottom(),
        "function" => Type::function(resolve_args(mapping, entry, &kind)?),
        "closure" => Type::closure(resolve_args(mapping, entry, &kind)?),
        "tuple" => Type::tuple(resolve_args(mapping, entry, &kind)?),
        "def_array" => {
            let args = resolve_args(mapping, entry, &kind)?;
            let elem = args.into_iter().next().ok_or_else(|| CoreError::MissingField {
                kind: kind.clone(),
                field: "args[0]".to_string(),
            })?;
            let length = entry
                .get("length")
                .or_else(|| entry.get("lenght"))
                .and_then(Value::as_u64)
                .ok_or_else(|| CoreError::MissingField {
                    kind: kind.clone(),
                    field: "length".to_string(),
                })?;
            Type::definite_array(elem, length)
        }
        "indef_array" => {
            let args = resolve_args(mapping, entry, &kind)?;
            let elem = args.into_iter().next().ok_or_else(|| CoreError::MissingField {
                kind: kind.clone(),
                field: "args[0]".to_string(),
            })?;
            Type::indefinite_array(elem)
        }
        "struct" | "variant" => {
            let nominal_key = if kind == "struct" {
                "struct_name"
            } else {
                "variant_name"
            };
            let nominal = field(entry, &kind, nominal_key)?
                .as_str()
                .ok_or_else(|| CoreError::MissingField {
                    kind: kind.clone(),
                    field: nominal_key.to_string(),
                })?
                .to_string();

            if entry.get("args").is_some() {
                // Definition entry: the declaration must already be in
                // `mapping` under this same name.
                let existing = resolve(mapping, &name)?.clone();
                let arg_names = field(entry, &kind, "arg_names")?;
                let arg_names: Vec<String> = arg_names
                    .as_array()
                    .ok_or_else(|| CoreError::MissingField {
                        kind: kind.clone(),
                        field: "arg_names".to_string(),
                    })?
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect();
                let args = resolve_args(mapping, entry, &kind)?;
                existing.fill_fields(arg_names.into_iter().zip(args).collect());
                return Ok(());
            }

            // Declaration entry. The source project's reconstruction
            // instantiates a struct handle even for a "variant" entry;
            // that is a bug (spec.md §9) — we fix it and build the
            // matching kind here instead.
            if kind == "struct" {
                Type::struct_forward_decl(nominal)
            } else {
                Type::variant_forward_decl(nominal)
            }
        }
        other => return Err(CoreError::UnknownTypeKind(other.to_string())),
    };

    mapping.insert(name, ty);
    Ok(())
}

pub fn reconstruct_table(entries: &[Value]) -> Result<HashMap<String, Type>> {
    let mut mapping = HashMap::new();
    for entry in entries {
        reconstruct_entry(&mut mapping, entry)?;
    }
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleContext;
    use serde_json::json;

    #[test]
    fn variant_declaration_reconstructs_as_variant_not_struct() {
        let mut module = ModuleContext::open("t");
        let variant_ty = Type::variant_forward_decl("Maybe");
        variant_ty.fill_fields(vec![
            ("none".to_string(), Type::scalar(PrimTag::Bool)),
            ("some".to_string(), Type::scalar(PrimTag::Qs32)),
        ]);
        variant_ty.materialize(&mut module);

        let mapping = reconstruct_table(&module.type_table).expect("reconstruct succeeds");
        let name = variant_ty.cached_name().unwrap().to_string();
        let reconstructed = mapping.get(&name).expect("reconstructed handle present").clone();

        let mut fresh = ModuleContext::open("fresh");
        reconstructed.materialize(&mut fresh);
        let entry = fresh
            .type_table
            .iter()
            .find(|e| e["variant_name"] == json!("Maybe") && e.get("args").is_some())
            .expect("variant definition entry present");
        assert_eq!(
            entry["type"],
            json!("variant"),
            "a `variant` declaration must reconstruct as a variant, not a struct"
        );
    }

    #[test]
    fn type_table_round_trips_through_reconstruct() {
        let mut module = ModuleContext::open("t");
        let i32_ty = Type::scalar(PrimTag::Qs32);
        let ptr_ty = Type::pointer(i32_ty.clone());
        let struct_ty = Type::struct_("Pair", vec![("a".to_string(), i32_ty), ("b".to_string(), ptr_ty)]);
        struct_ty.materialize(&mut module);
        let original = module.type_table.clone();

        let mapping = reconstruct_table(&original).expect("reconstruct succeeds");
        let name = struct_ty.cached_name().unwrap().to_string();
        let reconstructed = mapping.get(&name).expect("reconstructed handle present").clone();

        let mut rebuilt = ModuleContext::open("rebuilt");
        reconstructed.materialize(&mut rebuilt);
        assert_eq!(
            rebuilt.type_table, original,
            "reconstruct(serialize(M)).serialize() must reproduce serialize(M)"
        );
    }
}
