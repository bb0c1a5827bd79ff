//! Semantic layer over annotated server sources.
//!
//! Parses source files into syntax trees, builds a symbol table of the
//! types, methods and attributes they declare (plus the types exported by
//! metadata references), and offers a per-tree expression typing service
//! for callers that need the semantic type of an expression deep inside a
//! method body.

pub mod builder;
pub mod error;
pub mod references;
pub mod source;
pub mod symbols;
pub mod typing;

pub use builder::build_symbol_table;
pub use error::SemanticsError;
pub use references::{Export, Reference};
pub use source::{SourceFile, SyntaxTree};
pub use symbols::{
    AttrArg, AttrUse, ExtraMember, MemberKind, MethodId, MethodSymbol, ParamSymbol, Property,
    SymbolTable, TreeId, TypeId, TypeKind, TypeOrigin, TypeRef, TypeSymbol,
};
pub use typing::{return_position_calls, ReturnCall, SemanticModel, Typed};
