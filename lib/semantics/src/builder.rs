//! Two-pass symbol table construction.
//!
//! Pass one walks every tree and declares the types it finds (plus the
//! types exported by the references), so that names are known before
//! anything is resolved. Pass two resolves base types, attribute classes,
//! field and signature types against the declared names.
//!
//! Attributes the model does not know (`derive`, `serde`, lints, ...) are
//! dropped. `#[extends(...)]` is consumed structurally: it sets the base
//! type instead of appearing as an attribute usage.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use syn::spanned::Spanned;
use tracing::debug;

use crate::references::Reference;
use crate::source::SyntaxTree;
use crate::symbols::{
    resolve_path, resolve_short, resolve_syn_type, AttrArg, AttrUse, ExtraMember, Lookup,
    MemberKind, MethodId, MethodSymbol, ParamSymbol, Property, SymbolTable, TreeId, TypeId,
    TypeKind, TypeOrigin, TypeRef, TypeSymbol,
};

/// Build a symbol table from parsed trees and resolved references.
pub fn build_symbol_table(trees: Vec<SyntaxTree>, references: &[Arc<Reference>]) -> SymbolTable {
    let mut b = Builder::default();

    for reference in references {
        for export in &reference.exports {
            b.declare(
                export.name.clone(),
                format!("{}::{}", reference.name, export.name),
                export.kind,
                TypeOrigin::Reference {
                    location: reference.location.clone(),
                },
            );
        }
    }

    for (index, tree) in trees.iter().enumerate() {
        let mut module = Vec::new();
        b.collect_items(TreeId(index), &tree.file.items, &mut module);
    }

    b.resolve(&trees);

    SymbolTable {
        trees,
        types: b.types,
        methods: b.methods,
        by_qualified: b.by_qualified,
        by_short: b.by_short,
    }
}

#[derive(Default)]
struct Builder {
    types: Vec<TypeSymbol>,
    methods: Vec<MethodSymbol>,
    by_qualified: HashMap<String, TypeId>,
    by_short: HashMap<String, Vec<TypeId>>,
    raw_types: Vec<RawType>,
    raw_impls: Vec<RawImpl>,
    raw_fns: Vec<RawFn>,
}

enum RawTypeItem {
    Struct(syn::ItemStruct),
    Enum(syn::ItemEnum),
}

struct RawType {
    id: TypeId,
    tree: TreeId,
    item: RawTypeItem,
}

struct RawImpl {
    tree: TreeId,
    module: Vec<String>,
    item: syn::ItemImpl,
}

struct RawFn {
    tree: TreeId,
    item: syn::ItemFn,
}

struct Maps<'a> {
    by_qualified: &'a HashMap<String, TypeId>,
    by_short: &'a HashMap<String, Vec<TypeId>>,
    types: &'a [TypeSymbol],
}

impl Lookup for Maps<'_> {
    fn by_qualified(&self, qualified: &str) -> Option<TypeId> {
        self.by_qualified.get(qualified).copied()
    }

    fn by_short(&self, name: &str) -> Option<TypeId> {
        resolve_short(self.by_short, self.types, name)
    }

    fn kind_of(&self, id: TypeId) -> TypeKind {
        self.types[id.0].kind
    }
}

impl Builder {
    fn declare(
        &mut self,
        name: String,
        qualified: String,
        kind: TypeKind,
        origin: TypeOrigin,
    ) -> TypeId {
        let id = TypeId(self.types.len());
        self.types.push(TypeSymbol {
            id,
            name: name.clone(),
            qualified: qualified.clone(),
            kind,
            origin,
            base: None,
            attrs: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            extra_members: Vec::new(),
            doc: None,
        });
        self.by_qualified.entry(qualified).or_insert(id);
        self.by_short.entry(name).or_default().push(id);
        id
    }

    fn collect_items(&mut self, tree: TreeId, items: &[syn::Item], module: &mut Vec<String>) {
        for item in items {
            match item {
                syn::Item::Struct(s) => {
                    let name = s.ident.to_string();
                    let id = self.declare(
                        name.clone(),
                        qualify(module, &name),
                        TypeKind::Struct,
                        TypeOrigin::Source { tree },
                    );
                    self.raw_types.push(RawType {
                        id,
                        tree,
                        item: RawTypeItem::Struct(s.clone()),
                    });
                }
                syn::Item::Enum(e) => {
                    let name = e.ident.to_string();
                    let id = self.declare(
                        name.clone(),
                        qualify(module, &name),
                        TypeKind::Enum,
                        TypeOrigin::Source { tree },
                    );
                    self.raw_types.push(RawType {
                        id,
                        tree,
                        item: RawTypeItem::Enum(e.clone()),
                    });
                }
                syn::Item::Impl(i) => self.raw_impls.push(RawImpl {
                    tree,
                    module: module.clone(),
                    item: i.clone(),
                }),
                syn::Item::Fn(f) => self.raw_fns.push(RawFn {
                    tree,
                    item: f.clone(),
                }),
                syn::Item::Mod(m) => {
                    if let Some((_, nested)) = &m.content {
                        module.push(m.ident.to_string());
                        self.collect_items(tree, nested, module);
                        module.pop();
                    }
                }
                _ => {}
            }
        }
    }

    fn resolve(&mut self, trees: &[SyntaxTree]) {
        let raw_types = std::mem::take(&mut self.raw_types);
        for raw in raw_types {
            let text = &trees[raw.tree.0].text;
            match raw.item {
                RawTypeItem::Struct(s) => {
                    let (resolved, properties) = {
                        let maps = self.maps();
                        let resolved = resolve_attrs(&s.attrs, &maps);
                        let properties = struct_properties(&s, text, &maps);
                        (resolved, properties)
                    };
                    let ty = &mut self.types[raw.id.0];
                    ty.base = resolved.base;
                    ty.doc = resolved.doc();
                    ty.attrs = resolved.uses;
                    ty.properties = properties;
                }
                RawTypeItem::Enum(e) => {
                    let resolved = {
                        let maps = self.maps();
                        resolve_attrs(&e.attrs, &maps)
                    };
                    let ty = &mut self.types[raw.id.0];
                    ty.base = resolved.base;
                    ty.doc = resolved.doc();
                    ty.attrs = resolved.uses;
                }
            }
        }

        let raw_impls = std::mem::take(&mut self.raw_impls);
        for raw in raw_impls {
            if raw.item.trait_.is_some() {
                continue;
            }
            let self_path = match raw.item.self_ty.as_ref() {
                syn::Type::Path(tp) => tp.path.clone(),
                _ => continue,
            };
            let owner = {
                let maps = self.maps();
                resolve_impl_target(&self_path, &raw.module, &maps)
            };
            let Some(owner) = owner else {
                debug!(
                    "impl block target did not resolve in {}",
                    trees[raw.tree.0].path
                );
                continue;
            };
            let text = &trees[raw.tree.0].text;
            for impl_item in raw.item.items {
                match impl_item {
                    syn::ImplItem::Fn(f) => {
                        let byte_range = f.span().byte_range();
                        let pending = {
                            let maps = self.maps();
                            resolve_method(
                                &f.sig,
                                &f.attrs,
                                &f.block,
                                byte_range,
                                Some(owner),
                                raw.tree,
                                text,
                                &maps,
                            )
                        };
                        let id = self.push_method(pending);
                        self.types[owner.0].methods.push(id);
                    }
                    syn::ImplItem::Const(c) => {
                        self.types[owner.0].extra_members.push(ExtraMember {
                            name: c.ident.to_string(),
                            kind: MemberKind::Const,
                        });
                    }
                    syn::ImplItem::Type(t) => {
                        self.types[owner.0].extra_members.push(ExtraMember {
                            name: t.ident.to_string(),
                            kind: MemberKind::TypeAlias,
                        });
                    }
                    syn::ImplItem::Macro(m) => {
                        let name = m
                            .mac
                            .path
                            .segments
                            .last()
                            .map(|s| s.ident.to_string())
                            .unwrap_or_default();
                        self.types[owner.0].extra_members.push(ExtraMember {
                            name,
                            kind: MemberKind::Macro,
                        });
                    }
                    _ => {}
                }
            }
        }

        let raw_fns = std::mem::take(&mut self.raw_fns);
        for raw in raw_fns {
            let text = &trees[raw.tree.0].text;
            let byte_range = raw.item.span().byte_range();
            let pending = {
                let maps = self.maps();
                resolve_method(
                    &raw.item.sig,
                    &raw.item.attrs,
                    &raw.item.block,
                    byte_range,
                    None,
                    raw.tree,
                    text,
                    &maps,
                )
            };
            self.push_method(pending);
        }
    }

    fn maps(&self) -> Maps<'_> {
        Maps {
            by_qualified: &self.by_qualified,
            by_short: &self.by_short,
            types: &self.types,
        }
    }

    fn push_method(&mut self, pending: PendingMethod) -> MethodId {
        let id = MethodId(self.methods.len());
        self.methods.push(MethodSymbol {
            id,
            name: pending.name,
            owner: pending.owner,
            tree: pending.tree,
            params: pending.params,
            return_type: pending.return_type,
            attrs: pending.attrs,
            doc: pending.doc,
            body: pending.body,
            byte_range: pending.byte_range,
        });
        id
    }
}

fn qualify(module: &[String], name: &str) -> String {
    if module.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", module.join("::"), name)
    }
}

#[derive(Default)]
struct ResolvedAttrs {
    uses: Vec<AttrUse>,
    base: Option<TypeId>,
    doc_lines: Vec<String>,
}

impl ResolvedAttrs {
    fn doc(&self) -> Option<String> {
        if self.doc_lines.is_empty() {
            None
        } else {
            Some(self.doc_lines.join("\n"))
        }
    }
}

fn resolve_attrs(attrs: &[syn::Attribute], lookup: &dyn Lookup) -> ResolvedAttrs {
    let mut out = ResolvedAttrs::default();
    for attr in attrs {
        if attr.path().is_ident("doc") {
            if let syn::Meta::NameValue(nv) = &attr.meta {
                if let syn::Expr::Lit(el) = &nv.value {
                    if let syn::Lit::Str(s) = &el.lit {
                        out.doc_lines.push(s.value().trim().to_string());
                    }
                }
            }
            continue;
        }
        if attr.path().is_ident("extends") {
            match attr.parse_args::<syn::Path>() {
                Ok(path) => match resolve_path(&path, lookup) {
                    Some(id) => out.base = Some(id),
                    None => debug!("base type in extends(...) did not resolve"),
                },
                Err(_) => debug!("malformed extends(...) attribute"),
            }
            continue;
        }
        let Some(class) = resolve_attr_class(attr.path(), lookup) else {
            continue;
        };
        out.uses.push(AttrUse {
            class,
            args: parse_attr_args(attr),
        });
    }
    out
}

/// An attribute path names an attribute class only if it resolves to a
/// symbol of attribute kind; everything else is not ours.
fn resolve_attr_class(path: &syn::Path, lookup: &dyn Lookup) -> Option<TypeId> {
    let id = resolve_path(path, lookup)?;
    if lookup.kind_of(id) == TypeKind::Attribute {
        Some(id)
    } else {
        None
    }
}

fn parse_attr_args(attr: &syn::Attribute) -> Vec<AttrArg> {
    use syn::punctuated::Punctuated;
    match &attr.meta {
        syn::Meta::Path(_) | syn::Meta::NameValue(_) => Vec::new(),
        syn::Meta::List(_) => attr
            .parse_args_with(Punctuated::<syn::Lit, syn::Token![,]>::parse_terminated)
            .map(|lits| lits.iter().map(lit_to_arg).collect())
            .unwrap_or_default(),
    }
}

fn lit_to_arg(lit: &syn::Lit) -> AttrArg {
    match lit {
        syn::Lit::Str(s) => AttrArg::Str(s.value()),
        syn::Lit::Int(i) => i
            .base10_parse::<i64>()
            .map(AttrArg::Int)
            .unwrap_or_else(|_| AttrArg::Other(i.to_string())),
        syn::Lit::Bool(b) => AttrArg::Other(b.value.to_string()),
        syn::Lit::Float(f) => AttrArg::Other(f.to_string()),
        syn::Lit::Char(c) => AttrArg::Other(c.value().to_string()),
        _ => AttrArg::Other(String::new()),
    }
}

fn struct_properties(
    item: &syn::ItemStruct,
    tree_text: &str,
    lookup: &dyn Lookup,
) -> Vec<Property> {
    let syn::Fields::Named(named) = &item.fields else {
        return Vec::new();
    };
    named
        .named
        .iter()
        .map(|field| Property {
            name: field
                .ident
                .as_ref()
                .map(|i| i.to_string())
                .unwrap_or_default(),
            ty: resolve_syn_type(&field.ty, tree_text, lookup),
            public: matches!(field.vis, syn::Visibility::Public(_)),
        })
        .collect()
}

/// Resolve an `impl` target: a bare name is tried against the enclosing
/// module first, a qualified path resolves as written.
fn resolve_impl_target(
    path: &syn::Path,
    module: &[String],
    lookup: &dyn Lookup,
) -> Option<TypeId> {
    if path.segments.len() == 1 {
        let name = path.segments[0].ident.to_string();
        if !module.is_empty() {
            let qualified = format!("{}::{}", module.join("::"), name);
            if let Some(id) = lookup.by_qualified(&qualified) {
                return Some(id);
            }
        }
        return lookup.by_short(&name);
    }
    resolve_path(path, lookup)
}

struct PendingMethod {
    name: String,
    owner: Option<TypeId>,
    tree: TreeId,
    params: Vec<ParamSymbol>,
    return_type: Option<TypeRef>,
    attrs: Vec<AttrUse>,
    doc: Option<String>,
    body: syn::Block,
    byte_range: Range<usize>,
}

#[allow(clippy::too_many_arguments)]
fn resolve_method(
    sig: &syn::Signature,
    attrs: &[syn::Attribute],
    block: &syn::Block,
    byte_range: Range<usize>,
    owner: Option<TypeId>,
    tree: TreeId,
    text: &str,
    lookup: &dyn Lookup,
) -> PendingMethod {
    let resolved = resolve_attrs(attrs, lookup);
    let params = sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            syn::FnArg::Receiver(_) => None,
            syn::FnArg::Typed(pt) => {
                let name = match pt.pat.as_ref() {
                    syn::Pat::Ident(pi) => pi.ident.to_string(),
                    _ => "_".to_string(),
                };
                Some(ParamSymbol {
                    name,
                    ty: resolve_syn_type(&pt.ty, text, lookup),
                })
            }
        })
        .collect();
    let return_type = match &sig.output {
        syn::ReturnType::Default => None,
        syn::ReturnType::Type(_, ty) => match ty.as_ref() {
            syn::Type::Tuple(t) if t.elems.is_empty() => None,
            other => Some(resolve_syn_type(other, text, lookup)),
        },
    };
    PendingMethod {
        name: sig.ident.to_string(),
        owner,
        tree,
        params,
        return_type,
        doc: resolved.doc(),
        attrs: resolved.uses,
        body: block.clone(),
        byte_range,
    }
}
