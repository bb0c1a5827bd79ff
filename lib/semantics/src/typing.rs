//! Expression typing over method bodies.
//!
//! Two pieces: `return_position_calls` finds the invocations a method
//! returns (explicit `return` operands plus the trailing tail call), and
//! `SemanticModel` assigns types to expressions against the symbol table.
//! Typing is best-effort: anything outside the modeled shapes is
//! `Typed::Unresolved`, never an error.

use syn::spanned::Spanned;

use crate::symbols::{
    resolve_path, resolve_syn_type, MethodSymbol, SymbolTable, TreeId, TypeId, TypeKind, TypeRef,
};

/// Result of typing an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Typed {
    Known(TypeRef),
    /// The expression resolves but produces nothing (unit).
    Unit,
    Unresolved,
}

/// An invocation in return position.
#[derive(Debug, Clone, Copy)]
pub struct ReturnCall<'a> {
    pub expr: &'a syn::Expr,
}

impl<'a> ReturnCall<'a> {
    pub fn first_arg(&self) -> Option<&'a syn::Expr> {
        match self.expr {
            syn::Expr::Call(c) => c.args.first(),
            syn::Expr::MethodCall(m) => m.args.first(),
            _ => None,
        }
    }

    pub fn arg_count(&self) -> usize {
        match self.expr {
            syn::Expr::Call(c) => c.args.len(),
            syn::Expr::MethodCall(m) => m.args.len(),
            _ => 0,
        }
    }
}

fn is_invocation(expr: &syn::Expr) -> bool {
    matches!(expr, syn::Expr::Call(_) | syn::Expr::MethodCall(_))
}

struct ReturnWalker<'ast> {
    calls: Vec<ReturnCall<'ast>>,
}

impl<'ast> syn::visit::Visit<'ast> for ReturnWalker<'ast> {
    fn visit_expr(&mut self, expr: &'ast syn::Expr) {
        match expr {
            syn::Expr::Return(ret) => {
                if let Some(inner) = ret.expr.as_deref() {
                    if is_invocation(inner) {
                        self.calls.push(ReturnCall { expr: inner });
                    } else {
                        self.visit_expr(inner);
                    }
                }
            }
            // Arguments of an invocation are not return positions of this
            // method, so the walker does not descend into them.
            syn::Expr::Call(_) | syn::Expr::MethodCall(_) => {}
            other => syn::visit::visit_expr(self, other),
        }
    }
}

/// Collect the invocations a body returns, in source order: every direct
/// operand of a `return` that is a call, plus the body's trailing tail
/// expression when it is a call. The tail comes last.
pub fn return_position_calls(body: &syn::Block) -> Vec<ReturnCall<'_>> {
    use syn::visit::Visit;
    let mut walker = ReturnWalker { calls: Vec::new() };
    walker.visit_block(body);
    if let Some(syn::Stmt::Expr(expr, None)) = body.stmts.last() {
        if is_invocation(expr) {
            walker.calls.push(ReturnCall { expr });
        }
    }
    walker.calls
}

struct Scope {
    bindings: Vec<(String, TypeRef)>,
    owner: Option<TypeId>,
}

impl Scope {
    fn lookup(&self, name: &str) -> Option<&TypeRef> {
        self.bindings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, ty)| ty)
    }
}

/// Types expressions of one tree against the symbol table.
pub struct SemanticModel<'a> {
    table: &'a SymbolTable,
    tree: TreeId,
}

impl<'a> SemanticModel<'a> {
    pub fn new(table: &'a SymbolTable, tree: TreeId) -> Self {
        Self { table, tree }
    }

    /// Type an expression taken from this tree. The enclosing method is
    /// located by byte range; its receiver, parameters and the `let`
    /// bindings preceding the expression are in scope.
    pub fn type_of_expr(&self, expr: &syn::Expr) -> Typed {
        let range = expr.span().byte_range();
        let method = self
            .table
            .methods()
            .filter(|m| {
                m.tree == self.tree
                    && m.byte_range.start <= range.start
                    && range.end <= m.byte_range.end
            })
            .min_by_key(|m| m.byte_range.end - m.byte_range.start);

        let mut scope = Scope {
            bindings: Vec::new(),
            owner: None,
        };
        if let Some(method) = method {
            if let Some(owner) = method.owner {
                scope.owner = Some(owner);
                scope.bindings.push((
                    "self".to_string(),
                    TypeRef::with_target(self.table.type_symbol(owner).name.clone(), owner),
                ));
            }
            for param in &method.params {
                scope.bindings.push((param.name.clone(), param.ty.clone()));
            }
            self.bind_locals(method, range.start, &mut scope);
        }
        self.type_in(expr, &scope)
    }

    /// Top-level `let` statements of the body that precede the expression,
    /// typed from their annotation or their initializer.
    fn bind_locals(&self, method: &MethodSymbol, before: usize, scope: &mut Scope) {
        for stmt in &method.body.stmts {
            let syn::Stmt::Local(local) = stmt else {
                continue;
            };
            if local.span().byte_range().end > before {
                break;
            }
            let (name, annotated) = match &local.pat {
                syn::Pat::Ident(pi) => (pi.ident.to_string(), None),
                syn::Pat::Type(pt) => match pt.pat.as_ref() {
                    syn::Pat::Ident(pi) => (
                        pi.ident.to_string(),
                        Some(resolve_syn_type(&pt.ty, self.text(), self.table)),
                    ),
                    _ => continue,
                },
                _ => continue,
            };
            let ty = match annotated {
                Some(ty) => Some(ty),
                None => local.init.as_ref().and_then(|init| {
                    match self.type_in(&init.expr, scope) {
                        Typed::Known(tr) => Some(tr),
                        _ => None,
                    }
                }),
            };
            if let Some(ty) = ty {
                scope.bindings.push((name, ty));
            }
        }
    }

    fn type_in(&self, expr: &syn::Expr, scope: &Scope) -> Typed {
        match expr {
            syn::Expr::Lit(l) => self.type_of_lit(&l.lit),
            syn::Expr::Path(p) => self.type_of_path(p, scope),
            syn::Expr::Call(c) => self.type_of_call(c, scope),
            syn::Expr::MethodCall(m) => self.type_of_method_call(m, scope),
            syn::Expr::Struct(s) => self.type_of_struct_expr(s, scope),
            syn::Expr::Field(f) => self.type_of_field(f, scope),
            syn::Expr::Reference(r) => self.type_in(&r.expr, scope),
            syn::Expr::Paren(p) => self.type_in(&p.expr, scope),
            syn::Expr::Await(a) => self.type_in(&a.base, scope),
            syn::Expr::Cast(c) => {
                Typed::Known(resolve_syn_type(&c.ty, self.text(), self.table))
            }
            _ => Typed::Unresolved,
        }
    }

    fn type_of_lit(&self, lit: &syn::Lit) -> Typed {
        let name = match lit {
            syn::Lit::Int(i) if i.suffix().is_empty() => "i32".to_string(),
            syn::Lit::Int(i) => i.suffix().to_string(),
            syn::Lit::Float(f) if f.suffix().is_empty() => "f64".to_string(),
            syn::Lit::Float(f) => f.suffix().to_string(),
            syn::Lit::Str(_) => "String".to_string(),
            syn::Lit::Bool(_) => "bool".to_string(),
            syn::Lit::Char(_) => "char".to_string(),
            _ => return Typed::Unresolved,
        };
        Typed::Known(self.named(&name))
    }

    fn type_of_path(&self, p: &syn::ExprPath, scope: &Scope) -> Typed {
        if p.qself.is_some() {
            return Typed::Unresolved;
        }
        let segs: Vec<String> = p
            .path
            .segments
            .iter()
            .map(|s| s.ident.to_string())
            .collect();
        match segs.as_slice() {
            [single] => {
                if let Some(ty) = scope.lookup(single) {
                    return Typed::Known(ty.clone());
                }
                if single.as_str() == "Self" {
                    return self.owner_type(scope);
                }
                match self.table.lookup_short(single) {
                    Some(id) => Typed::Known(self.type_ref(id)),
                    None => Typed::Unresolved,
                }
            }
            // `Enum::Variant` is a value of the enum.
            [head, _member] => {
                if head.as_str() == "Self" {
                    return self.owner_type(scope);
                }
                match self.table.lookup_short(head) {
                    Some(id) if self.table.type_symbol(id).kind == TypeKind::Enum => {
                        Typed::Known(self.type_ref(id))
                    }
                    _ => Typed::Unresolved,
                }
            }
            _ => Typed::Unresolved,
        }
    }

    fn type_of_call(&self, c: &syn::ExprCall, scope: &Scope) -> Typed {
        let syn::Expr::Path(p) = c.func.as_ref() else {
            return Typed::Unresolved;
        };
        if p.qself.is_some() {
            return Typed::Unresolved;
        }
        let segs: Vec<String> = p
            .path
            .segments
            .iter()
            .map(|s| s.ident.to_string())
            .collect();
        match segs.len() {
            1 => {
                if let Some(f) = self.table.free_fn(&segs[0]) {
                    return self.method_result(f);
                }
                // Tuple-struct constructor.
                match self.table.lookup_short(&segs[0]) {
                    Some(id) if self.table.type_symbol(id).kind == TypeKind::Struct => {
                        Typed::Known(self.type_ref(id))
                    }
                    _ => Typed::Unresolved,
                }
            }
            2 => {
                let target = if segs[0] == "Self" {
                    scope.owner
                } else {
                    self.table.lookup_short(&segs[0])
                };
                let Some(target) = target else {
                    return Typed::Unresolved;
                };
                match self.table.method_on(target, &segs[1]) {
                    Some(m) => self.method_result(m),
                    // `Type::constructor(...)` with no modeled method is
                    // taken to produce the type itself (`String::new`,
                    // enum variant constructors, `T::default`).
                    None => Typed::Known(self.type_ref(target)),
                }
            }
            _ => Typed::Unresolved,
        }
    }

    fn type_of_method_call(&self, m: &syn::ExprMethodCall, scope: &Scope) -> Typed {
        let Typed::Known(receiver) = self.type_in(&m.receiver, scope) else {
            return Typed::Unresolved;
        };
        let Some(target) = receiver.target else {
            return Typed::Unresolved;
        };
        match self.table.method_on(target, &m.method.to_string()) {
            Some(found) => self.method_result(found),
            None => Typed::Unresolved,
        }
    }

    fn type_of_struct_expr(&self, s: &syn::ExprStruct, scope: &Scope) -> Typed {
        if s.path.segments.len() == 1 && s.path.segments[0].ident == "Self" {
            return self.owner_type(scope);
        }
        match resolve_path(&s.path, self.table) {
            Some(id) => Typed::Known(self.type_ref(id)),
            None => Typed::Unresolved,
        }
    }

    fn type_of_field(&self, f: &syn::ExprField, scope: &Scope) -> Typed {
        let Typed::Known(base) = self.type_in(&f.base, scope) else {
            return Typed::Unresolved;
        };
        let Some(target) = base.target else {
            return Typed::Unresolved;
        };
        let syn::Member::Named(name) = &f.member else {
            return Typed::Unresolved;
        };
        let ty = self.table.type_symbol(target);
        match ty.properties.iter().find(|p| name == p.name.as_str()) {
            Some(p) => Typed::Known(p.ty.clone()),
            None => Typed::Unresolved,
        }
    }

    fn method_result(&self, m: &MethodSymbol) -> Typed {
        match &m.return_type {
            Some(tr) => Typed::Known(tr.clone()),
            None => Typed::Unit,
        }
    }

    fn owner_type(&self, scope: &Scope) -> Typed {
        match scope.owner {
            Some(id) => Typed::Known(self.type_ref(id)),
            None => Typed::Unresolved,
        }
    }

    fn type_ref(&self, id: TypeId) -> TypeRef {
        TypeRef::with_target(self.table.type_symbol(id).name.clone(), id)
    }

    fn named(&self, name: &str) -> TypeRef {
        TypeRef {
            name: name.to_string(),
            args: Vec::new(),
            target: self.table.lookup_short(name),
        }
    }

    fn text(&self) -> &str {
        &self.table.tree(self.tree).text
    }
}
