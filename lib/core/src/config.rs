//! Generator configuration, overridable from the project manifest.

use serde::{Deserialize, Serialize};

/// Generator options. Every field has a default, so a manifest's
/// `[generator]` table may override any subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Marker path of the controller base type.
    pub base_type: String,
    /// Marker path of the method-level route attribute.
    pub route_attr: String,
    /// Marker path of the class-level route prefix attribute.
    pub route_prefix_attr: String,
    /// Display name of the opaque action-result return type.
    pub opaque_result: String,
    /// Module the synthesized unit declares.
    pub dest_module: String,
    /// Abort on unexpected controller members instead of skipping them.
    pub strict: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_type: "web::ApiController".to_string(),
            route_attr: "web::route".to_string(),
            route_prefix_attr: "web::route_prefix".to_string(),
            opaque_result: "ActionResult".to_string(),
            dest_module: "clients".to_string(),
            strict: false,
        }
    }
}

/// A reference declared in the manifest: a location plus the type names
/// it exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraReference {
    pub location: String,
    /// Namespace the exports are qualified under; defaults to the
    /// location string.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exports: Vec<String>,
}

impl ExtraReference {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_markers() {
        let cfg = GeneratorConfig::default();
        assert_eq!(cfg.base_type, "web::ApiController");
        assert_eq!(cfg.route_attr, "web::route");
        assert_eq!(cfg.route_prefix_attr, "web::route_prefix");
        assert_eq!(cfg.opaque_result, "ActionResult");
        assert_eq!(cfg.dest_module, "clients");
        assert!(!cfg.strict);
    }

    #[test]
    fn partial_toml_overrides_keep_defaults() {
        let cfg: GeneratorConfig = toml::from_str(
            r#"
            strict = true
            dest_module = "generated"
            "#,
        )
        .unwrap();
        assert!(cfg.strict);
        assert_eq!(cfg.dest_module, "generated");
        assert_eq!(cfg.base_type, "web::ApiController");
    }

    #[test]
    fn extra_reference_defaults_name_to_location() {
        let r: ExtraReference = toml::from_str(
            r#"
            location = "entities.list"
            exports = ["CustomerRecord"]
            "#,
        )
        .unwrap();
        assert_eq!(r.display_name(), "entities.list");
        assert_eq!(r.exports, vec!["CustomerRecord".to_string()]);
    }
}
