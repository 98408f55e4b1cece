//! Provider registry: runtime registrations merged with the compiled
//! mapping.
//!
//! ## Merge rule
//!
//! ```text
//!                     providers(service)
//!                            │
//!             runtime entry present? ──yes──▶ runtime entry
//!                            │no
//!        compiled mapping present and version == 1? ──yes──▶ compiled entry
//!                            │no
//!                          empty
//! ```
//!
//! The compiled mapping is only read for services with no runtime entry.
//! The first successful `register` call for a service copies the compiled
//! contribution into the runtime table and appends to it ("crystallizes"
//! it); from then on the runtime entry is authoritative for that service.
//! Deferring the compiled read until first access means services nobody
//! requests never pay for it, and hosts without a compiled mapping still
//! work - unregistered services simply have zero providers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::compiled::{CompiledMapping, COMPILED_FORMAT_VERSION};
use crate::id::{ProviderId, ServiceId};

/// Process-wide store of `service -> providers` registrations.
///
/// Constructed once per process (or per test) with a fixed catalog and an
/// optional compiled mapping; registration and lookup are then safe from
/// any number of call sites.
pub struct Registry {
    catalog: Arc<Catalog>,
    compiled: Option<Arc<dyn CompiledMapping>>,
    runtime: RwLock<HashMap<ServiceId, Vec<ProviderId>>>,
}

impl Registry {
    /// Registry over the given catalog, with no compiled mapping.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            compiled: None,
            runtime: RwLock::new(HashMap::new()),
        }
    }

    /// Registry over the given catalog and compiled mapping.
    pub fn with_compiled(catalog: Arc<Catalog>, compiled: Arc<dyn CompiledMapping>) -> Self {
        Self {
            catalog,
            compiled: Some(compiled),
            runtime: RwLock::new(HashMap::new()),
        }
    }

    /// Registry wired to the link-time catalog and compiled mapping.
    pub fn linked() -> Self {
        Self::with_compiled(
            Arc::new(Catalog::linked()),
            Arc::new(crate::compiled::LinkedMapping),
        )
    }

    /// The catalog backing identity resolution.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Register a provider implementation for a service contract.
    ///
    /// Idempotent on identity: if the provider is already in the effective
    /// list for the service (including via the compiled mapping), returns
    /// `true` without mutating anything. Otherwise the registration is
    /// accepted only if the service identity resolves in the catalog and
    /// the provider identity resolves with all of its requirements
    /// satisfied; a rejected registration returns `false` and leaves the
    /// registry unchanged.
    ///
    /// Returns whether the provider is available for loading.
    pub fn register(&self, service: ServiceId, provider: ProviderId) -> bool {
        // One write lock across the read-merge-write so that concurrent
        // registrations for the same service are linearized.
        let mut runtime = self.runtime.write().expect("lock poisoned");

        let merged = match runtime.get(&service) {
            Some(entry) => entry.clone(),
            None => self.compiled_providers(service),
        };
        if merged.contains(&provider) {
            return true;
        }

        if !self.catalog.service_resolvable(service) {
            warn!(%service, %provider, "registration rejected: unresolvable service");
            return false;
        }
        if !self.catalog.provider_available(provider) {
            warn!(
                %service,
                %provider,
                "registration rejected: provider unresolvable or requirements unsatisfied"
            );
            return false;
        }

        let mut entry = merged;
        entry.push(provider);
        runtime.insert(service, entry);
        debug!(%service, %provider, "registered service provider");
        true
    }

    /// Effective providers for a service: the runtime entry if present,
    /// otherwise the compiled entry, otherwise empty.
    pub fn providers(&self, service: ServiceId) -> Vec<ProviderId> {
        if let Some(entry) = self
            .runtime
            .read()
            .expect("lock poisoned")
            .get(&service)
        {
            return entry.clone();
        }
        self.compiled_providers(service)
    }

    fn compiled_providers(&self, service: ServiceId) -> Vec<ProviderId> {
        let Some(compiled) = &self.compiled else {
            return Vec::new();
        };
        if compiled.version() != COMPILED_FORMAT_VERSION {
            return Vec::new();
        }
        let mut providers = Vec::new();
        for provider in compiled.providers(service) {
            // Duplicate suppression: the first occurrence wins.
            if !providers.contains(&provider) {
                providers.push(provider);
            }
        }
        providers
    }
}
