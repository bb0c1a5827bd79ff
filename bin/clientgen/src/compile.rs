//! Compile-and-report over the synthesized unit.
//!
//! Re-parses the unit and resolves the names it uses against its own
//! declarations plus the references the unit links. Findings come back
//! as diagnostics; they are reported, never fatal.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use proc_macro2::Span;
use syn::punctuated::Punctuated;
use syn::visit::Visit;

use clientgen_semantics::references::Reference;

/// Names that resolve without any reference export.
const BUILTIN: &[&str] = &["str", "Self"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Warning => write!(f, "Warning"),
        }
    }
}

#[derive(Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl Diagnostic {
    fn at(severity: Severity, message: String, span: Span) -> Self {
        let start = span.start();
        Self {
            severity,
            message,
            line: start.line,
            column: start.column + 1,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}:{})",
            self.severity, self.message, self.line, self.column
        )
    }
}

/// Check the unit text against the given references. A syntax error ends
/// the check immediately; otherwise every used name is resolved and the
/// imports are checked both ways (resolvable, and actually used).
pub fn verify_unit(unit: &str, references: &[Arc<Reference>]) -> Vec<Diagnostic> {
    let file = match syn::parse_file(unit) {
        Ok(file) => file,
        Err(err) => {
            return vec![Diagnostic::at(
                Severity::Error,
                format!("syntax error: {err}"),
                err.span(),
            )]
        }
    };

    let mut survey = Survey::default();
    survey.visit_file(&file);

    let mut known: HashSet<&str> = BUILTIN.iter().copied().collect();
    for reference in references {
        for export in &reference.exports {
            known.insert(export.name.as_str());
        }
    }
    for name in &survey.declared {
        known.insert(name.as_str());
    }
    let reference_names: HashSet<&str> = references.iter().map(|r| r.name.as_str()).collect();

    let mut diagnostics = Vec::new();
    for (head, span) in &survey.import_heads {
        if !reference_names.contains(head.as_str()) {
            diagnostics.push(Diagnostic::at(
                Severity::Error,
                format!("unresolved import `{head}`"),
                *span,
            ));
        }
    }
    for (name, span) in &survey.used {
        if !known.contains(name.as_str()) {
            diagnostics.push(Diagnostic::at(
                Severity::Error,
                format!("unknown type `{name}`"),
                *span,
            ));
        }
    }

    let used_names: HashSet<&str> = survey.used.iter().map(|(n, _)| n.as_str()).collect();
    for (name, span) in &survey.imports {
        if !used_names.contains(name.as_str()) {
            diagnostics.push(Diagnostic::at(
                Severity::Warning,
                format!("unused import `{name}`"),
                *span,
            ));
        }
    }
    diagnostics
}

/// Names gathered in one walk: what the unit declares, what it imports,
/// and what it refers to in type-like positions.
#[derive(Default)]
struct Survey {
    declared: HashSet<String>,
    imports: Vec<(String, Span)>,
    import_heads: Vec<(String, Span)>,
    used: Vec<(String, Span)>,
}

impl Survey {
    fn collect_use(&mut self, tree: &syn::UseTree, at_head: bool) {
        match tree {
            syn::UseTree::Path(path) => {
                if at_head {
                    self.import_heads
                        .push((path.ident.to_string(), path.ident.span()));
                }
                self.collect_use(&path.tree, false);
            }
            syn::UseTree::Name(name) => {
                if at_head {
                    self.import_heads
                        .push((name.ident.to_string(), name.ident.span()));
                } else {
                    self.imports.push((name.ident.to_string(), name.ident.span()));
                }
            }
            syn::UseTree::Rename(rename) => {
                self.imports
                    .push((rename.rename.to_string(), rename.rename.span()));
            }
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.collect_use(item, at_head);
                }
            }
            syn::UseTree::Glob(_) => {}
        }
    }

    fn use_head(&mut self, path: &syn::Path) {
        if let Some(seg) = path.segments.first() {
            let name = seg.ident.to_string();
            // Expression paths also name locals; only capitalized heads
            // are type names here.
            if name.starts_with(char::is_uppercase) {
                self.used.push((name, seg.ident.span()));
            }
        }
    }
}

impl<'ast> Visit<'ast> for Survey {
    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        self.declared.insert(node.ident.to_string());
        syn::visit::visit_item_struct(self, node);
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.declared.insert(node.ident.to_string());
        syn::visit::visit_item_enum(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.collect_use(&node.tree, true);
    }

    fn visit_type_path(&mut self, node: &'ast syn::TypePath) {
        if let Some(seg) = node.path.segments.first() {
            self.used.push((seg.ident.to_string(), seg.ident.span()));
        }
        syn::visit::visit_type_path(self, node);
    }

    fn visit_expr_path(&mut self, node: &'ast syn::ExprPath) {
        self.use_head(&node.path);
        syn::visit::visit_expr_path(self, node);
    }

    fn visit_expr_struct(&mut self, node: &'ast syn::ExprStruct) {
        self.use_head(&node.path);
        syn::visit::visit_expr_struct(self, node);
    }

    fn visit_attribute(&mut self, node: &'ast syn::Attribute) {
        if node.path().is_ident("derive") {
            let parsed = node
                .parse_args_with(Punctuated::<syn::Path, syn::Token![,]>::parse_terminated);
            if let Ok(paths) = parsed {
                for path in &paths {
                    if let Some(seg) = path.segments.last() {
                        self.used.push((seg.ident.to_string(), seg.ident.span()));
                    }
                }
            }
        }
    }
}
