//! Metadata references: named bundles of type symbols that a compilation
//! links against. The built-in sets cover the runtime scalars, the web
//! framework markers the analyzed sources use, and the rest-client types
//! the synthesized unit uses.

use crate::symbols::TypeKind;

/// A type exported by a reference.
#[derive(Debug, Clone)]
pub struct Export {
    pub name: String,
    pub kind: TypeKind,
}

impl Export {
    pub fn new(name: &str, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

/// A resolved metadata reference. `location` identifies it for caching,
/// `name` is the namespace its exports are qualified under.
#[derive(Debug, Clone)]
pub struct Reference {
    pub location: String,
    pub name: String,
    pub exports: Vec<Export>,
}

impl Reference {
    pub fn new(location: impl Into<String>, name: impl Into<String>, exports: Vec<Export>) -> Self {
        Self {
            location: location.into(),
            name: name.into(),
            exports,
        }
    }
}

pub const RUNTIME_FALLBACK_LOCATION: &str = "<builtin:runtime>";
pub const WEB_LOCATION: &str = "<builtin:web>";
pub const REST_CLIENT_LOCATION: &str = "<builtin:rest-client>";
pub const SERDE_LOCATION: &str = "<builtin:serde>";

const SCALARS: &[&str] = &[
    "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "f32", "f64", "bool", "char", "usize",
    "isize", "String",
];

/// Runtime reference: scalar value types, the container types, and the
/// `Default` trait the synthesized unit leans on. `String` counts as a
/// value type here.
pub fn runtime_reference(location: &str) -> Reference {
    let mut exports: Vec<Export> = SCALARS
        .iter()
        .map(|name| Export::new(name, TypeKind::Scalar))
        .collect();
    exports.push(Export::new("Vec", TypeKind::Container));
    exports.push(Export::new("Option", TypeKind::Container));
    exports.push(Export::new("Default", TypeKind::Trait));
    exports.push(Export::new("Debug", TypeKind::Trait));
    exports.push(Export::new("Clone", TypeKind::Trait));
    Reference::new(location, "runtime", exports)
}

/// Web framework reference: the controller base marker, the opaque action
/// result, and the route/verb attribute classes.
pub fn web_reference() -> Reference {
    Reference::new(
        WEB_LOCATION,
        "web",
        vec![
            Export::new("ApiController", TypeKind::Opaque),
            Export::new("ActionResult", TypeKind::Opaque),
            Export::new("route", TypeKind::Attribute),
            Export::new("route_prefix", TypeKind::Attribute),
            Export::new("http_get", TypeKind::Attribute),
            Export::new("http_post", TypeKind::Attribute),
            Export::new("http_put", TypeKind::Attribute),
            Export::new("http_delete", TypeKind::Attribute),
        ],
    )
}

/// Rest client reference for the synthesized unit.
pub fn rest_client_reference() -> Reference {
    Reference::new(
        REST_CLIENT_LOCATION,
        "clientgen_client",
        vec![
            Export::new("RestClient", TypeKind::Opaque),
            Export::new("RestRequest", TypeKind::Opaque),
            Export::new("Method", TypeKind::Opaque),
        ],
    )
}

/// Serde derives referenced by the synthesized data types.
pub fn serde_reference() -> Reference {
    Reference::new(
        SERDE_LOCATION,
        "serde",
        vec![
            Export::new("Serialize", TypeKind::Trait),
            Export::new("Deserialize", TypeKind::Trait),
        ],
    )
}

/// A caller-declared reference: a location plus an explicit export list.
/// The exports are opaque named types; nothing about their shape is known.
pub fn declared_reference(location: &str, name: &str, exports: &[String]) -> Reference {
    Reference::new(
        location,
        name,
        exports
            .iter()
            .map(|n| Export::new(n, TypeKind::Opaque))
            .collect(),
    )
}
