//! Per-run reference cache.
//!
//! Maps location strings to resolved reference handles with get-or-create
//! semantics safe under concurrent population: the first caller for a
//! location resolves it, later callers observe the cached handle. The
//! runtime reference location comes from a one-shot probe of the search
//! directories, cached for the lifetime of the cache.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::debug;

use clientgen_semantics::references::{
    declared_reference, rest_client_reference, runtime_reference, serde_reference, web_reference,
    Reference, REST_CLIENT_LOCATION, RUNTIME_FALLBACK_LOCATION, SERDE_LOCATION, WEB_LOCATION,
};

/// Environment variable naming the directory probed for the runtime
/// library.
pub const RUNTIME_DIR_ENV: &str = "CLIENTGEN_RUNTIME_DIR";

pub struct ReferenceCache {
    entries: DashMap<String, Arc<Reference>>,
    runtime_location: OnceLock<String>,
    search_dirs: Vec<PathBuf>,
}

impl ReferenceCache {
    /// Cache probing the directory named by `CLIENTGEN_RUNTIME_DIR`, when
    /// set, for the runtime library.
    pub fn new() -> Self {
        let dirs = std::env::var_os(RUNTIME_DIR_ENV)
            .map(|dir| vec![PathBuf::from(dir)])
            .unwrap_or_default();
        Self::with_search_dirs(dirs)
    }

    pub fn with_search_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            entries: DashMap::new(),
            runtime_location: OnceLock::new(),
            search_dirs,
        }
    }

    /// Get-or-create a reference for a location. `make` runs at most once
    /// per location, even under concurrent callers.
    pub fn resolve(&self, location: &str, make: impl FnOnce() -> Reference) -> Arc<Reference> {
        self.entries
            .entry(location.to_string())
            .or_insert_with(|| Arc::new(make()))
            .value()
            .clone()
    }

    /// The runtime reference. Its location is probed once and reused for
    /// every later call.
    pub fn runtime(&self) -> Arc<Reference> {
        let location = self.runtime_location.get_or_init(|| self.probe_runtime());
        self.resolve(location, || runtime_reference(location))
    }

    pub fn web(&self) -> Arc<Reference> {
        self.resolve(WEB_LOCATION, web_reference)
    }

    pub fn rest_client(&self) -> Arc<Reference> {
        self.resolve(REST_CLIENT_LOCATION, rest_client_reference)
    }

    pub fn serde(&self) -> Arc<Reference> {
        self.resolve(SERDE_LOCATION, serde_reference)
    }

    /// A manifest-declared reference with an explicit export list.
    pub fn declared(&self, location: &str, name: &str, exports: &[String]) -> Arc<Reference> {
        self.resolve(location, || declared_reference(location, name, exports))
    }

    fn probe_runtime(&self) -> String {
        for dir in &self.search_dirs {
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let name = entry.file_name();
                let Some(name) = name.to_str() else {
                    continue;
                };
                if name.starts_with("libstd-") && name.ends_with(".rlib") {
                    return entry.path().display().to_string();
                }
            }
        }
        debug!("no runtime library found in search directories, using builtin fallback");
        RUNTIME_FALLBACK_LOCATION.to_string()
    }
}

impl Default for ReferenceCache {
    fn default() -> Self {
        Self::new()
    }
}
