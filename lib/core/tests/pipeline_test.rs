//! End-to-end pipeline test: annotated server sources in, synthesized
//! client unit out.

use clientgen_core::{run, ExtraReference, GenError, GeneratorConfig, ReferenceCache, VOID};
use clientgen_semantics::SourceFile;

const DOMAIN_SRC: &str = r#"
/// One catalog item.
pub struct Item {
    pub id: i32,
    pub name: String,
    in_stock: bool,
}

pub struct ItemService;

impl ItemService {
    pub fn find(&self, id: i32) -> Item {
        Item { id, name: String::new(), in_stock: false }
    }

    pub fn all(&self) -> Vec<Item> {
        Vec::new()
    }
}
"#;

const CONTROLLER_SRC: &str = r#"
#[extends(ApiController)]
#[route_prefix("api/items")]
pub struct ItemsController {
    service: ItemService,
}

impl ItemsController {
    /// Fetch one item by id.
    #[route("/{id}")]
    #[http_get]
    pub fn get_item(&self, id: i32) -> ActionResult {
        return respond(self.service.find(id));
    }

    #[route("")]
    #[http_post]
    pub fn create(&self, item: Item) {}

    #[route("/all")]
    pub fn list(&self) -> Vec<Item> {
        self.service.all()
    }

    pub fn not_an_action(&self) {}
}

#[extends(ItemsController)]
pub struct SpecialItemsController;

impl SpecialItemsController {
    #[route("/special")]
    pub fn special(&self) {}
}
"#;

fn sources() -> Vec<SourceFile> {
    vec![
        SourceFile::new("domain.rs", DOMAIN_SRC),
        SourceFile::new("controllers.rs", CONTROLLER_SRC),
    ]
}

fn cache() -> ReferenceCache {
    ReferenceCache::with_search_dirs(Vec::new())
}

#[test]
fn full_run_synthesizes_the_client_unit() {
    let out = run(sources(), &[], &GeneratorConfig::default(), &cache()).unwrap();

    assert_eq!(out.controllers, vec!["ItemsController".to_string()]);
    assert_eq!(
        out.actions,
        vec![
            "ItemsController.get_item".to_string(),
            "ItemsController.create".to_string(),
            "ItemsController.list".to_string(),
        ]
    );

    assert_eq!(out.clients.len(), 1);
    let endpoints = &out.clients[0].endpoints;
    assert_eq!(endpoints[0].uri, "api/items/{id}");
    assert_eq!(endpoints[1].uri, "api/items");
    assert_eq!(endpoints[2].uri, "api/items/all");

    // The opaque declared return resolved to the body payload; the bare
    // method stayed void; the structured return rendered as declared.
    assert_eq!(endpoints[0].return_type, "Item");
    assert_eq!(endpoints[1].return_type, VOID);
    assert_eq!(endpoints[2].return_type, "Vec<Item>");

    // Item flattened once, public fields only.
    assert_eq!(out.simple_types.len(), 1);
    assert_eq!(out.simple_types[0].name, "Item");
    let members: Vec<&str> = out.simple_types[0]
        .members
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(members, vec!["id", "name"]);

    let unit = &out.unit;
    assert!(unit.contains("pub mod clients {"));
    assert!(unit.contains("pub struct ItemsController {"));
    assert!(unit.contains("/// Fetch one item by id."));
    assert!(unit.contains("pub async fn get_item(&self, id: i32) -> Item {"));
    assert!(unit.contains("RestRequest::new(\"api/items/{id}\", Method::Get);"));
    assert!(unit.contains("self.client.execute::<Item>(&request).await;"));
    assert!(unit.contains("pub async fn create(&self, item: Item) {"));
    assert!(unit.contains("Method::Post"));
    assert!(unit.contains("execute::<()>"));
    assert!(unit.contains("pub async fn list(&self) -> Vec<Item> {"));
    assert!(unit.contains("execute::<Vec<Item>>"));
    assert!(unit.contains("pub struct Item {"));
    assert!(!unit.contains("in_stock"));
    assert!(!unit.contains("SpecialItemsController"));
}

#[test]
fn unhandled_members_are_skipped_and_reported() {
    let out = run(sources(), &[], &GeneratorConfig::default(), &cache()).unwrap();
    let skipped: Vec<(&str, &str)> = out
        .skipped
        .iter()
        .map(|s| (s.name.as_str(), s.kind.as_str()))
        .collect();
    assert_eq!(skipped.len(), 2);
    assert!(skipped.contains(&("service", "field")));
    assert!(skipped.contains(&("not_an_action", "method")));
}

#[test]
fn strict_mode_aborts_on_the_first_unhandled_member() {
    let cfg = GeneratorConfig {
        strict: true,
        ..Default::default()
    };
    let err = run(sources(), &[], &cfg, &cache()).unwrap_err();
    match err {
        GenError::UnexpectedMember { owner, name, kind } => {
            assert_eq!(owner, "ItemsController");
            assert_eq!(name, "service");
            assert_eq!(kind, "field");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn base_marker_can_come_from_a_declared_reference() {
    let src = r#"
        #[extends(BillingBase)]
        #[route_prefix("api/billing")]
        pub struct BillingController;

        impl BillingController {
            #[route("/total")]
            pub fn total(&self) -> i32 {
                0
            }
        }
    "#;
    let extra = ExtraReference {
        location: "billing.lib".to_string(),
        name: Some("billing".to_string()),
        exports: vec!["BillingBase".to_string()],
    };
    let cfg = GeneratorConfig {
        base_type: "billing::BillingBase".to_string(),
        ..Default::default()
    };
    let out = run(
        vec![SourceFile::new("billing.rs", src)],
        &[extra],
        &cfg,
        &cache(),
    )
    .unwrap();
    assert_eq!(out.controllers, vec!["BillingController".to_string()]);
    assert!(out.unit.contains("pub async fn total(&self) -> i32 {"));
    assert!(out.unit.contains("RestRequest::new(\"api/billing/total\", Method::Get);"));
}

#[test]
fn unknown_marker_configuration_aborts() {
    let cfg = GeneratorConfig {
        base_type: "web::NoSuchBase".to_string(),
        ..Default::default()
    };
    let err = run(sources(), &[], &cfg, &cache()).unwrap_err();
    assert!(matches!(err, GenError::UnknownMarker(_)));
}

#[test]
fn parse_failures_surface_as_semantics_errors() {
    let bad = SourceFile::new("broken.rs", "pub struct {");
    let err = run(vec![bad], &[], &GeneratorConfig::default(), &cache()).unwrap_err();
    assert!(matches!(err, GenError::Semantics(_)));
}

#[test]
fn destination_module_follows_configuration() {
    let cfg = GeneratorConfig {
        dest_module: "generated".to_string(),
        ..Default::default()
    };
    let out = run(sources(), &[], &cfg, &cache()).unwrap();
    assert!(out.unit.contains("pub mod generated {"));
}
