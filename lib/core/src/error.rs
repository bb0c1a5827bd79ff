use clientgen_semantics::SemanticsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error(transparent)]
    Semantics(#[from] SemanticsError),

    #[error("marker type `{0}` is not known to the compilation")]
    UnknownMarker(String),

    #[error("unexpected {kind} `{name}` on controller {owner}")]
    UnexpectedMember {
        owner: String,
        name: String,
        kind: String,
    },

    #[error("action {owner}.{method} carries no route marker")]
    MissingRoute { owner: String, method: String },

    #[error("action {owner}.{method} carries more than one route marker")]
    DuplicateRoute { owner: String, method: String },

    #[error("controller {owner} carries more than one route prefix")]
    DuplicatePrefix { owner: String },

    #[error("route prefix on controller {owner} has no string argument")]
    EmptyPrefix { owner: String },

    #[error("duplicate name `{0}` in synthesized unit")]
    DuplicateName(String),
}
