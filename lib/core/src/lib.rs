//! Client generation pipeline.
//!
//! Takes the symbol table of an annotated server codebase, discovers the
//! controllers and their route-marked actions, derives endpoint
//! descriptors (verb, URI, parameters, payload type), flattens the data
//! types crossing the wire, and synthesizes a typed client source unit.

pub mod config;
pub mod discovery;
pub mod endpoints;
pub mod error;
pub mod flatten;
pub mod model;
pub mod pipeline;
pub mod refcache;
pub mod returns;
pub mod synth;

pub use config::{ExtraReference, GeneratorConfig};
pub use discovery::{DiscoveryOutcome, Markers, SkippedMember};
pub use error::GenError;
pub use model::{
    ClientDescriptor, EndpointDescriptor, HttpVerb, Member, Parameter, SimpleType, VOID,
};
pub use pipeline::{run, RunOutput};
pub use refcache::ReferenceCache;
