//! Symbol discovery: controllers and their route-marked actions.
//!
//! A controller is a source type whose base is *identical* to the
//! configured base marker (one level, never a transitive walk). An action
//! is a controller method carrying the route marker, again by identity.

use clientgen_semantics::{MethodId, SymbolTable, TypeId};
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::error::GenError;

/// The marker symbols of one run, resolved against the symbol table.
#[derive(Debug, Clone, Copy)]
pub struct Markers {
    pub base: TypeId,
    pub route: TypeId,
    pub prefix: TypeId,
}

impl Markers {
    pub fn resolve(table: &SymbolTable, cfg: &GeneratorConfig) -> Result<Self, GenError> {
        let base = table
            .lookup_marker(&cfg.base_type)
            .ok_or_else(|| GenError::UnknownMarker(cfg.base_type.clone()))?;
        let route = table
            .lookup_marker(&cfg.route_attr)
            .ok_or_else(|| GenError::UnknownMarker(cfg.route_attr.clone()))?;
        let prefix = table
            .lookup_marker(&cfg.route_prefix_attr)
            .ok_or_else(|| GenError::UnknownMarker(cfg.route_prefix_attr.clone()))?;
        Ok(Self {
            base,
            route,
            prefix,
        })
    }
}

/// A controller member the traversal classified but did not act on.
#[derive(Debug, Clone)]
pub struct SkippedMember {
    pub owner: String,
    pub name: String,
    pub kind: String,
}

/// Discovery result. Controllers keep declaration order; actions keep
/// (controller, declaration) order; skipped members are reported for
/// callers that want to inspect what the traversal passed over.
#[derive(Debug, Default)]
pub struct DiscoveryOutcome {
    pub controllers: Vec<TypeId>,
    pub actions: Vec<MethodId>,
    pub skipped: Vec<SkippedMember>,
}

/// Walk the source types, keep the direct children of the base marker,
/// and split their members into actions and skipped members. With
/// `strict` set, a member kind the traversal does not handle aborts the
/// run instead of being skipped.
pub fn discover(
    table: &SymbolTable,
    markers: &Markers,
    strict: bool,
) -> Result<DiscoveryOutcome, GenError> {
    let mut outcome = DiscoveryOutcome::default();
    for ty in table.source_types() {
        debug!("Type: {}", ty.name);
        if ty.base != Some(markers.base) {
            continue;
        }
        outcome.controllers.push(ty.id);

        for prop in &ty.properties {
            if strict {
                return Err(GenError::UnexpectedMember {
                    owner: ty.name.clone(),
                    name: prop.name.clone(),
                    kind: "field".to_string(),
                });
            }
            outcome.skipped.push(SkippedMember {
                owner: ty.name.clone(),
                name: prop.name.clone(),
                kind: "field".to_string(),
            });
        }
        for member in &ty.extra_members {
            if strict {
                return Err(GenError::UnexpectedMember {
                    owner: ty.name.clone(),
                    name: member.name.clone(),
                    kind: member.kind.to_string(),
                });
            }
            outcome.skipped.push(SkippedMember {
                owner: ty.name.clone(),
                name: member.name.clone(),
                kind: member.kind.to_string(),
            });
        }

        for id in &ty.methods {
            let method = table.method(*id);
            if method.attrs.iter().any(|a| a.class == markers.route) {
                outcome.actions.push(*id);
            } else {
                outcome.skipped.push(SkippedMember {
                    owner: ty.name.clone(),
                    name: method.name.clone(),
                    kind: "method".to_string(),
                });
            }
        }
    }
    Ok(outcome)
}
