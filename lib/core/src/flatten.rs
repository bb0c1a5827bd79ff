//! Type flattening: the bridge from symbol-level types to the plain data
//! structs the synthesized unit declares.

use std::collections::HashSet;

use clientgen_semantics::{SymbolTable, TypeId, TypeKind, TypeRef};

use crate::model::{Member, SimpleType};

/// The type a reference flattens to: a single-argument generic unwraps
/// one level to its sole argument, anything else flattens to itself.
/// Only one level; payloads nested deeper stay textual.
fn flatten_target(tr: &TypeRef) -> &TypeRef {
    match tr.args.as_slice() {
        [single] => single,
        _ => tr,
    }
}

/// Project one type to a SimpleType: a source-declared struct yields its
/// public fields in declaration order. Value types, containers, markers
/// and reference-declared or unresolved types yield nothing.
pub fn flatten_type(table: &SymbolTable, tr: &TypeRef) -> Option<SimpleType> {
    let id = flatten_target(tr).target?;
    let ty = table.type_symbol(id);
    if ty.kind != TypeKind::Struct || !ty.origin.is_source() {
        return None;
    }
    Some(SimpleType {
        name: ty.name.clone(),
        members: ty
            .properties
            .iter()
            .filter(|p| p.public)
            .map(|p| Member {
                name: p.name.clone(),
                type_name: p.ty.render(),
            })
            .collect(),
    })
}

/// Run both collection passes (parameter types, payload types) through
/// the shared projector, de-duplicated by flatten-target identity in
/// first-occurrence order.
pub fn collect_simple_types(
    table: &SymbolTable,
    param_types: &[TypeRef],
    payload_types: &[TypeRef],
) -> Vec<SimpleType> {
    let mut seen: HashSet<TypeId> = HashSet::new();
    let mut out = Vec::new();
    for tr in param_types.iter().chain(payload_types) {
        let Some(id) = flatten_target(tr).target else {
            continue;
        };
        if !seen.insert(id) {
            continue;
        }
        if let Some(simple) = flatten_type(table, tr) {
            out.push(simple);
        }
    }
    out
}
