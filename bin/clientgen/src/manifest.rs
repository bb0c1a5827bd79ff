//! Project manifest: the TOML file naming the server sources to analyze,
//! plus optional generator overrides and extra metadata references.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use clientgen_core::{ExtraReference, GeneratorConfig};

#[derive(Debug, Deserialize)]
pub struct ProjectManifest {
    pub project: ProjectSection,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub references: Vec<ExtraReference>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectSection {
    pub name: String,
    /// Source files in compilation order, relative to the manifest.
    pub sources: Vec<String>,
}

impl ProjectManifest {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading project manifest {}", path.display()))?;
        let manifest = toml::from_str(&text)
            .with_context(|| format!("parsing project manifest {}", path.display()))?;
        Ok(manifest)
    }

    /// Source paths resolved against the manifest's directory.
    pub fn resolve_sources(&self, manifest_path: &Path) -> Vec<PathBuf> {
        let base = manifest_path.parent().unwrap_or_else(|| Path::new(""));
        self.project.sources.iter().map(|s| base.join(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        [project]
        name = "inventory-server"
        sources = ["src/domain.rs", "src/controllers.rs"]

        [generator]
        dest_module = "generated"
        strict = true

        [[references]]
        location = "billing.lib"
        name = "billing"
        exports = ["BillingBase", "Money"]
    "#;

    #[test]
    fn parses_a_full_manifest() {
        let manifest: ProjectManifest = toml::from_str(FULL).unwrap();
        assert_eq!(manifest.project.name, "inventory-server");
        assert_eq!(
            manifest.project.sources,
            vec!["src/domain.rs".to_string(), "src/controllers.rs".to_string()]
        );
        assert_eq!(manifest.generator.dest_module, "generated");
        assert!(manifest.generator.strict);
        assert_eq!(manifest.references.len(), 1);
        assert_eq!(manifest.references[0].location, "billing.lib");
        assert_eq!(manifest.references[0].display_name(), "billing");
        assert_eq!(manifest.references[0].exports.len(), 2);
    }

    #[test]
    fn generator_and_references_default_when_absent() {
        let manifest: ProjectManifest = toml::from_str(
            r#"
            [project]
            name = "bare"
            sources = ["main.rs"]
            "#,
        )
        .unwrap();
        assert_eq!(manifest.generator.dest_module, "clients");
        assert!(!manifest.generator.strict);
        assert!(manifest.references.is_empty());
    }

    #[test]
    fn sources_resolve_relative_to_the_manifest_directory() {
        let manifest: ProjectManifest = toml::from_str(
            r#"
            [project]
            name = "relative"
            sources = ["src/a.rs", "src/b.rs"]
            "#,
        )
        .unwrap();
        let resolved = manifest.resolve_sources(Path::new("/work/server/project.toml"));
        assert_eq!(resolved[0], PathBuf::from("/work/server/src/a.rs"));
        assert_eq!(resolved[1], PathBuf::from("/work/server/src/b.rs"));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.toml");
        std::fs::write(&path, FULL).unwrap();
        let manifest = ProjectManifest::load(&path).unwrap();
        assert_eq!(manifest.project.name, "inventory-server");
    }

    #[test]
    fn load_reports_the_offending_path() {
        let err = ProjectManifest::load(Path::new("/no/such/project.toml")).unwrap_err();
        assert!(err.to_string().contains("/no/such/project.toml"));
    }
}
