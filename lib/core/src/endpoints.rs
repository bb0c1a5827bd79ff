//! Endpoint descriptor construction from discovered actions.

use std::collections::HashMap;

use clientgen_semantics::{MethodId, MethodSymbol, SymbolTable, TypeId, TypeRef, TypeSymbol};

use crate::discovery::Markers;
use crate::error::GenError;
use crate::model::{ClientDescriptor, EndpointDescriptor, HttpVerb, Parameter, VOID};
use crate::returns;

/// Verb markers matched by attribute class short name, scanned in
/// declaration order; the first match wins and no match means GET.
const VERB_MARKERS: &[(&str, HttpVerb)] = &[
    ("http_get", HttpVerb::Get),
    ("http_post", HttpVerb::Post),
    ("http_put", HttpVerb::Put),
    ("http_delete", HttpVerb::Delete),
];

/// Clients grouped out of the actions, plus the raw type material the
/// flattener consumes: non-value-type parameters and resolved payloads,
/// both in occurrence order.
#[derive(Debug, Default)]
pub struct CollectedClients {
    pub clients: Vec<ClientDescriptor>,
    pub param_types: Vec<TypeRef>,
    pub payload_types: Vec<TypeRef>,
}

/// Build one EndpointDescriptor per action and group them into clients by
/// controller, in first-occurrence order of the controllers.
pub fn collect_endpoints(
    table: &SymbolTable,
    markers: &Markers,
    opaque_result: &str,
    actions: &[MethodId],
) -> Result<CollectedClients, GenError> {
    let mut clients: Vec<ClientDescriptor> = Vec::new();
    let mut index: HashMap<TypeId, usize> = HashMap::new();
    let mut param_types = Vec::new();
    let mut payload_types = Vec::new();

    for id in actions {
        let method = table.method(*id);
        let Some(owner_id) = method.owner else {
            continue;
        };
        let owner = table.type_symbol(owner_id);

        let uri = action_uri(owner, method, markers)?;
        let verb = verb_of(table, method);
        let parameters = method
            .params
            .iter()
            .map(|p| Parameter {
                name: p.name.clone(),
                type_name: p.ty.render(),
            })
            .collect();
        for p in &method.params {
            if !is_value_type(table, &p.ty) {
                param_types.push(p.ty.clone());
            }
        }
        let (return_type, payload) = endpoint_return(table, method, opaque_result);
        if let Some(tr) = payload {
            payload_types.push(tr);
        }

        let endpoint = EndpointDescriptor {
            name: method.name.clone(),
            uri,
            verb,
            parameters,
            return_type,
            doc: method.doc.clone(),
        };

        let slot = *index.entry(owner_id).or_insert_with(|| {
            clients.push(ClientDescriptor {
                name: owner.name.clone(),
                endpoints: Vec::new(),
            });
            clients.len() - 1
        });
        clients[slot].endpoints.push(endpoint);
    }

    Ok(CollectedClients {
        clients,
        param_types,
        payload_types,
    })
}

fn verb_of(table: &SymbolTable, method: &MethodSymbol) -> HttpVerb {
    for attr in &method.attrs {
        let name = table.type_symbol(attr.class).name.as_str();
        for (marker, verb) in VERB_MARKERS {
            if name == *marker {
                return *verb;
            }
        }
    }
    HttpVerb::Get
}

/// Uri = class prefix + method route suffix, concatenated with no
/// separator. The prefix marker is optional (empty when absent); the
/// route marker is mandatory here: discovery only forwards route-marked
/// methods, so its absence is a precondition violation.
fn action_uri(
    owner: &TypeSymbol,
    method: &MethodSymbol,
    markers: &Markers,
) -> Result<String, GenError> {
    let mut prefixes = owner.attrs.iter().filter(|a| a.class == markers.prefix);
    let prefix = match (prefixes.next(), prefixes.next()) {
        (None, _) => String::new(),
        (Some(attr), None) => match attr.first_string() {
            Some(s) => s.to_string(),
            None => {
                return Err(GenError::EmptyPrefix {
                    owner: owner.name.clone(),
                })
            }
        },
        (Some(_), Some(_)) => {
            return Err(GenError::DuplicatePrefix {
                owner: owner.name.clone(),
            })
        }
    };

    let mut routes = method.attrs.iter().filter(|a| a.class == markers.route);
    let suffix = match (routes.next(), routes.next()) {
        (None, _) => {
            return Err(GenError::MissingRoute {
                owner: owner.name.clone(),
                method: method.name.clone(),
            })
        }
        (Some(attr), None) => attr.first_string().unwrap_or("").to_string(),
        (Some(_), Some(_)) => {
            return Err(GenError::DuplicateRoute {
                owner: owner.name.clone(),
                method: method.name.clone(),
            })
        }
    };

    Ok(format!("{prefix}{suffix}"))
}

/// Return type policy, in priority order: a value type renders directly;
/// the opaque marker (bare, or as the sole argument of a generic) defers
/// to the body-level resolver; anything else renders through the
/// recursive type-name rule; no declared type means void.
fn endpoint_return(
    table: &SymbolTable,
    method: &MethodSymbol,
    opaque_result: &str,
) -> (String, Option<TypeRef>) {
    let Some(declared) = &method.return_type else {
        return (VOID.to_string(), None);
    };
    if is_value_type(table, declared) {
        return (declared.render(), Some(declared.clone()));
    }
    let opaque_bare = declared.name == opaque_result && declared.args.is_empty();
    let opaque_wrapped = declared.args.len() == 1 && declared.args[0].name == opaque_result;
    if opaque_bare || opaque_wrapped {
        return returns::resolve_payload(table, method);
    }
    (declared.render(), Some(declared.clone()))
}

fn is_value_type(table: &SymbolTable, tr: &TypeRef) -> bool {
    tr.target
        .map(|id| table.type_symbol(id).is_value_type())
        .unwrap_or(false)
}
