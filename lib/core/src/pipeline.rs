//! End-to-end generation run: parse the sources, bind symbols, discover
//! controllers, collect endpoints, flatten data types, synthesize the
//! client unit.

use std::sync::Arc;

use tracing::info;

use clientgen_semantics::references::Reference;
use clientgen_semantics::{build_symbol_table, SourceFile, SyntaxTree};

use crate::config::{ExtraReference, GeneratorConfig};
use crate::discovery::{discover, Markers, SkippedMember};
use crate::endpoints::collect_endpoints;
use crate::error::GenError;
use crate::flatten::collect_simple_types;
use crate::model::{ClientDescriptor, SimpleType};
use crate::refcache::ReferenceCache;
use crate::synth::synthesize;

/// Everything one generation run produces, in report order.
#[derive(Debug)]
pub struct RunOutput {
    /// Controller type names, discovery order.
    pub controllers: Vec<String>,
    /// `Controller.action` labels, discovery order.
    pub actions: Vec<String>,
    pub skipped: Vec<SkippedMember>,
    pub clients: Vec<ClientDescriptor>,
    pub simple_types: Vec<SimpleType>,
    /// The synthesized source unit.
    pub unit: String,
}

/// Run the whole pipeline over a set of sources.
///
/// The compilation links the runtime and web references plus any
/// caller-declared extras; the rest-client and serde references only
/// matter to the unit's consumers, not to the analysis itself.
pub fn run(
    sources: Vec<SourceFile>,
    extra_references: &[ExtraReference],
    cfg: &GeneratorConfig,
    cache: &ReferenceCache,
) -> Result<RunOutput, GenError> {
    let mut trees = Vec::with_capacity(sources.len());
    for source in &sources {
        trees.push(SyntaxTree::parse(source)?);
    }

    let mut references: Vec<Arc<Reference>> = vec![cache.runtime(), cache.web()];
    for extra in extra_references {
        references.push(cache.declared(&extra.location, extra.display_name(), &extra.exports));
    }

    let table = build_symbol_table(trees, &references);
    let markers = Markers::resolve(&table, cfg)?;

    let outcome = discover(&table, &markers, cfg.strict)?;
    info!(
        "discovered {} controllers, {} actions",
        outcome.controllers.len(),
        outcome.actions.len()
    );

    let collected = collect_endpoints(&table, &markers, &cfg.opaque_result, &outcome.actions)?;
    let simple_types =
        collect_simple_types(&table, &collected.param_types, &collected.payload_types);
    let unit = synthesize(&cfg.dest_module, &collected.clients, &simple_types)?;

    let controllers = outcome
        .controllers
        .iter()
        .map(|id| table.type_symbol(*id).name.clone())
        .collect();
    let actions = outcome
        .actions
        .iter()
        .map(|id| {
            let method = table.method(*id);
            let owner = method
                .owner
                .map(|o| table.type_symbol(o).name.as_str())
                .unwrap_or("");
            format!("{owner}.{}", method.name)
        })
        .collect();

    Ok(RunOutput {
        controllers,
        actions,
        skipped: outcome.skipped,
        clients: collected.clients,
        simple_types,
        unit,
    })
}
