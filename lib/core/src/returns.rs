//! Payload recovery for opaque action results.
//!
//! When an action's declared return type erases the real payload (the
//! opaque action-result pattern), the payload is read from the body
//! instead: the last return-position invocation's first argument, typed
//! through the declaring tree's semantic model. This stage never fails;
//! anything it cannot resolve becomes the void sentinel.

use clientgen_semantics::{
    return_position_calls, MethodSymbol, SemanticModel, SymbolTable, TypeRef, Typed,
};
use syn::spanned::Spanned;
use tracing::warn;

use crate::model::VOID;

/// Resolve the payload type an action actually returns. Yields the
/// rendered name plus the resolved type (for flattening), or the void
/// sentinel when there is no return-bearing invocation, the invocation
/// has no arguments, or the argument's type does not resolve.
pub fn resolve_payload(table: &SymbolTable, method: &MethodSymbol) -> (String, Option<TypeRef>) {
    let calls = return_position_calls(&method.body);
    let Some(last) = calls.last() else {
        return (VOID.to_string(), None);
    };
    let Some(arg) = last.first_arg() else {
        return (VOID.to_string(), None);
    };
    match SemanticModel::new(table, method.tree).type_of_expr(arg) {
        Typed::Known(tr) => (tr.render(), Some(tr)),
        Typed::Unit => (VOID.to_string(), None),
        Typed::Unresolved => {
            let text = &table.tree(method.tree).text;
            let body = text.get(method.body.span().byte_range()).unwrap_or("");
            warn!(
                "payload type of {} did not resolve; body: {}",
                method.name, body
            );
            (VOID.to_string(), None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clientgen_semantics::references::{
        runtime_reference, web_reference, RUNTIME_FALLBACK_LOCATION,
    };
    use clientgen_semantics::{build_symbol_table, SourceFile, SyntaxTree};
    use std::sync::Arc;

    fn table(src: &str) -> SymbolTable {
        let tree = SyntaxTree::parse(&SourceFile::new("fixture.rs", src)).unwrap();
        let refs = vec![
            Arc::new(runtime_reference(RUNTIME_FALLBACK_LOCATION)),
            Arc::new(web_reference()),
        ];
        build_symbol_table(vec![tree], &refs)
    }

    fn payload_of(t: &SymbolTable, method: &str) -> String {
        let c = t.lookup_short("C").unwrap();
        let m = t.method_on(c, method).unwrap();
        resolve_payload(t, m).0
    }

    const SRC: &str = r#"
        pub struct Item {
            pub id: i32,
        }

        pub struct Svc;

        impl Svc {
            pub fn find(&self) -> Item { Item { id: 0 } }
            pub fn remove(&self) {}
        }

        #[extends(ApiController)]
        pub struct C {
            svc: Svc,
        }

        impl C {
            pub fn last_return_wins(&self, flag: bool) -> ActionResult {
                if flag {
                    return respond(1i64);
                }
                return respond(self.svc.find());
            }
            pub fn tail_call(&self) -> ActionResult {
                respond(self.svc.find())
            }
            pub fn no_invocation(&self) -> ActionResult {
                let x = 1;
                x
            }
            pub fn zero_arguments(&self) -> ActionResult {
                return respond();
            }
            pub fn unresolved_argument(&self) -> ActionResult {
                return respond(mystery());
            }
            pub fn unit_argument(&self) -> ActionResult {
                return respond(self.svc.remove());
            }
        }
        "#;

    #[test]
    fn last_return_position_invocation_wins() {
        let t = table(SRC);
        assert_eq!(payload_of(&t, "last_return_wins"), "Item");
    }

    #[test]
    fn tail_expression_counts_as_return_position() {
        let t = table(SRC);
        assert_eq!(payload_of(&t, "tail_call"), "Item");
    }

    #[test]
    fn no_invocation_falls_back_to_void() {
        let t = table(SRC);
        assert_eq!(payload_of(&t, "no_invocation"), VOID);
    }

    #[test]
    fn zero_argument_invocation_falls_back_to_void() {
        let t = table(SRC);
        assert_eq!(payload_of(&t, "zero_arguments"), VOID);
    }

    #[test]
    fn unresolved_argument_falls_back_to_void() {
        let t = table(SRC);
        assert_eq!(payload_of(&t, "unresolved_argument"), VOID);
    }

    #[test]
    fn unit_argument_falls_back_to_void() {
        let t = table(SRC);
        assert_eq!(payload_of(&t, "unit_argument"), VOID);
    }
}
