//! Symbol table: the typed view of the analyzed sources.
//!
//! Types, methods, attribute usages and type references are interned into
//! flat arenas addressed by `TypeId` / `MethodId`. Identity comparisons in
//! later stages are id comparisons against this table.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use crate::source::SyntaxTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(pub(crate) usize);

/// What kind of thing a type symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Source-declared named type with fields.
    Struct,
    /// Enumeration. Counts as a value type.
    Enum,
    /// Built-in scalar value type (`i32`, `bool`, `String`, ...).
    Scalar,
    /// Generic container (`Vec`, `Option`).
    Container,
    /// Attribute class usable in `#[...]` position.
    Attribute,
    /// Trait export, only relevant for name resolution.
    Trait,
    /// Reference-declared type with no known shape.
    Opaque,
}

impl TypeKind {
    pub fn is_value_type(self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Enum)
    }
}

/// Where a type symbol came from.
#[derive(Debug, Clone)]
pub enum TypeOrigin {
    Source { tree: TreeId },
    Reference { location: String },
}

impl TypeOrigin {
    pub fn is_source(&self) -> bool {
        matches!(self, TypeOrigin::Source { .. })
    }
}

/// A rendered-or-resolved reference to a type, e.g. a parameter type or a
/// generic argument. `target` is the resolved head symbol when the name
/// was resolvable; rendering works either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub args: Vec<TypeRef>,
    pub target: Option<TypeId>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            target: None,
        }
    }

    pub fn with_target(name: impl Into<String>, target: TypeId) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            target: Some(target),
        }
    }

    /// Render the type name: `Name` without arguments, otherwise
    /// `Name<A, B>` with arguments rendered recursively.
    pub fn render(&self) -> String {
        if self.args.is_empty() {
            return self.name.clone();
        }
        let args: Vec<String> = self.args.iter().map(TypeRef::render).collect();
        format!("{}<{}>", self.name, args.join(", "))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// One constructor argument of an attribute usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrArg {
    Str(String),
    Int(i64),
    Other(String),
}

/// An attribute applied to a type or method, resolved to its attribute
/// class symbol.
#[derive(Debug, Clone)]
pub struct AttrUse {
    pub class: TypeId,
    pub args: Vec<AttrArg>,
}

impl AttrUse {
    /// First constructor argument if it is a string literal.
    pub fn first_string(&self) -> Option<&str> {
        match self.args.first() {
            Some(AttrArg::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A named field of a source-declared struct, in declaration order.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub ty: TypeRef,
    pub public: bool,
}

/// A formal method parameter (receiver excluded).
#[derive(Debug, Clone)]
pub struct ParamSymbol {
    pub name: String,
    pub ty: TypeRef,
}

/// Member kinds the analysis records but does not model further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Const,
    TypeAlias,
    Macro,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemberKind::Field => "field",
            MemberKind::Const => "const",
            MemberKind::TypeAlias => "type alias",
            MemberKind::Macro => "macro",
        };
        f.write_str(s)
    }
}

/// A member of a type that is not a method: kept so traversals can report
/// what they skipped.
#[derive(Debug, Clone)]
pub struct ExtraMember {
    pub name: String,
    pub kind: MemberKind,
}

#[derive(Debug, Clone)]
pub struct TypeSymbol {
    pub id: TypeId,
    /// Short name, e.g. `ItemsController`.
    pub name: String,
    /// Module-qualified name, e.g. `server::ItemsController`.
    pub qualified: String,
    pub kind: TypeKind,
    pub origin: TypeOrigin,
    /// Declared base type, resolved by identity.
    pub base: Option<TypeId>,
    pub attrs: Vec<AttrUse>,
    /// Named fields in declaration order (source structs only).
    pub properties: Vec<Property>,
    /// Inherent methods in declaration order.
    pub methods: Vec<MethodId>,
    /// Non-method members, for traversal reporting.
    pub extra_members: Vec<ExtraMember>,
    pub doc: Option<String>,
}

impl TypeSymbol {
    pub fn is_value_type(&self) -> bool {
        self.kind.is_value_type()
    }
}

#[derive(Debug, Clone)]
pub struct MethodSymbol {
    pub id: MethodId,
    pub name: String,
    /// Owning type for inherent methods, `None` for free functions.
    pub owner: Option<TypeId>,
    pub tree: TreeId,
    pub params: Vec<ParamSymbol>,
    /// Declared return type; `None` means unit.
    pub return_type: Option<TypeRef>,
    pub attrs: Vec<AttrUse>,
    pub doc: Option<String>,
    pub body: syn::Block,
    /// Byte range of the whole item in its tree's text.
    pub byte_range: Range<usize>,
}

/// Name lookup over a (possibly still in-construction) symbol set.
pub(crate) trait Lookup {
    fn by_qualified(&self, qualified: &str) -> Option<TypeId>;
    /// Unique short-name match. Source-declared types shadow reference
    /// exports; an ambiguous name resolves to nothing.
    fn by_short(&self, name: &str) -> Option<TypeId>;
    fn kind_of(&self, id: TypeId) -> TypeKind;
}

/// Resolve a path to a type id: multi-segment paths by qualified name,
/// single segments by unique short name.
pub(crate) fn resolve_path(path: &syn::Path, lookup: &dyn Lookup) -> Option<TypeId> {
    let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
    match segments.len() {
        0 => None,
        1 => lookup.by_short(&segments[0]),
        _ => lookup.by_qualified(&segments.join("::")),
    }
}

/// Turn a `syn::Type` into a `TypeRef`, resolving the head name where
/// possible. Shapes the model does not understand render as their source
/// text.
pub(crate) fn resolve_syn_type(ty: &syn::Type, source_text: &str, lookup: &dyn Lookup) -> TypeRef {
    match ty {
        syn::Type::Path(tp) => {
            let Some(last) = tp.path.segments.last() else {
                return TypeRef::named("?");
            };
            let name = last.ident.to_string();
            let mut args = Vec::new();
            if let syn::PathArguments::AngleBracketed(ab) = &last.arguments {
                for arg in &ab.args {
                    if let syn::GenericArgument::Type(inner) = arg {
                        args.push(resolve_syn_type(inner, source_text, lookup));
                    }
                }
            }
            let target = resolve_path(&tp.path, lookup);
            TypeRef { name, args, target }
        }
        syn::Type::Reference(r) => resolve_syn_type(&r.elem, source_text, lookup),
        syn::Type::Paren(p) => resolve_syn_type(&p.elem, source_text, lookup),
        syn::Type::Group(g) => resolve_syn_type(&g.elem, source_text, lookup),
        other => {
            use syn::spanned::Spanned;
            let range = other.span().byte_range();
            let text = source_text.get(range).unwrap_or("?").trim();
            TypeRef::named(text)
        }
    }
}

/// The assembled symbol table.
#[derive(Debug)]
pub struct SymbolTable {
    pub(crate) trees: Vec<SyntaxTree>,
    pub(crate) types: Vec<TypeSymbol>,
    pub(crate) methods: Vec<MethodSymbol>,
    pub(crate) by_qualified: HashMap<String, TypeId>,
    pub(crate) by_short: HashMap<String, Vec<TypeId>>,
}

impl SymbolTable {
    pub fn tree(&self, id: TreeId) -> &SyntaxTree {
        &self.trees[id.0]
    }

    pub fn trees(&self) -> impl Iterator<Item = (TreeId, &SyntaxTree)> {
        self.trees.iter().enumerate().map(|(i, t)| (TreeId(i), t))
    }

    pub fn type_symbol(&self, id: TypeId) -> &TypeSymbol {
        &self.types[id.0]
    }

    pub fn method(&self, id: MethodId) -> &MethodSymbol {
        &self.methods[id.0]
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeSymbol> {
        self.types.iter()
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodSymbol> {
        self.methods.iter()
    }

    /// Source-declared types in declaration order.
    pub fn source_types(&self) -> impl Iterator<Item = &TypeSymbol> {
        self.types.iter().filter(|t| t.origin.is_source())
    }

    pub fn lookup_qualified(&self, qualified: &str) -> Option<TypeId> {
        self.by_qualified.get(qualified).copied()
    }

    pub fn lookup_short(&self, name: &str) -> Option<TypeId> {
        Lookup::by_short(self, name)
    }

    /// Resolve a configured marker path: qualified first, then unique
    /// short name of the last segment.
    pub fn lookup_marker(&self, path: &str) -> Option<TypeId> {
        if let Some(id) = self.lookup_qualified(path) {
            return Some(id);
        }
        let short = path.rsplit("::").next().unwrap_or(path);
        self.lookup_short(short)
    }

    /// Inherent method of `ty` by name.
    pub fn method_on(&self, ty: TypeId, name: &str) -> Option<&MethodSymbol> {
        self.type_symbol(ty)
            .methods
            .iter()
            .map(|id| self.method(*id))
            .find(|m| m.name == name)
    }

    /// Free function by name (first declaration wins).
    pub fn free_fn(&self, name: &str) -> Option<&MethodSymbol> {
        self.methods
            .iter()
            .find(|m| m.owner.is_none() && m.name == name)
    }
}

impl Lookup for SymbolTable {
    fn by_qualified(&self, qualified: &str) -> Option<TypeId> {
        self.by_qualified.get(qualified).copied()
    }

    fn by_short(&self, name: &str) -> Option<TypeId> {
        resolve_short(&self.by_short, &self.types, name)
    }

    fn kind_of(&self, id: TypeId) -> TypeKind {
        self.types[id.0].kind
    }
}

/// Shared short-name resolution: a unique source-declared match wins,
/// otherwise a unique match of any origin, otherwise nothing.
pub(crate) fn resolve_short(
    by_short: &HashMap<String, Vec<TypeId>>,
    types: &[TypeSymbol],
    name: &str,
) -> Option<TypeId> {
    let candidates = by_short.get(name)?;
    let source: Vec<TypeId> = candidates
        .iter()
        .copied()
        .filter(|id| types[id.0].origin.is_source())
        .collect();
    match source.as_slice() {
        [only] => return Some(*only),
        [] => {}
        _ => return None,
    }
    match candidates.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}
