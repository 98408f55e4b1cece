//! Compiled provider mappings.
//!
//! The build-time half of the system: a read-only, versioned
//! `service -> providers` table produced outside the registry. Here the
//! "build step" is the linker - dependency crates contribute
//! [`CompiledProviderEntry`] values to the [`COMPILED_PROVIDERS`]
//! distributed slice and the linker merges them across all units, exactly
//! like the per-dependency declarative mappings a build-time generator
//! would collect.
//!
//! The registry consumes mappings only through the [`CompiledMapping`]
//! trait and only trusts a mapping whose format version matches
//! [`COMPILED_FORMAT_VERSION`]. Any other version, or the absence of a
//! mapping altogether, behaves as an empty mapping - never as an error.

use serde::Serialize;

use crate::id::{ProviderId, ServiceId};

/// Compiled-mapping format version the registry trusts.
pub const COMPILED_FORMAT_VERSION: u32 = 1;

/// One compiled `service -> provider` association.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CompiledProviderEntry {
    /// The contract the provider is compiled in for.
    pub service: ServiceId,
    /// The provider implementation.
    pub provider: ProviderId,
}

/// Link-time compiled mapping entries.
#[linkme::distributed_slice]
pub static COMPILED_PROVIDERS: [CompiledProviderEntry] = [..];

/// Read-only, versioned `service -> providers` snapshot.
pub trait CompiledMapping: Send + Sync {
    /// Format version of the mapping.
    fn version(&self) -> u32;

    /// Providers compiled in for the given service, in mapping order.
    fn providers(&self, service: ServiceId) -> Vec<ProviderId>;
}

/// Compiled mapping assembled by the linker from distributed-slice entries.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkedMapping;

impl CompiledMapping for LinkedMapping {
    fn version(&self) -> u32 {
        COMPILED_FORMAT_VERSION
    }

    fn providers(&self, service: ServiceId) -> Vec<ProviderId> {
        COMPILED_PROVIDERS
            .iter()
            .filter(|entry| entry.service == service)
            .map(|entry| entry.provider)
            .collect()
    }
}

/// Owned in-memory compiled mapping with an explicit format version.
///
/// Used by hosts that assemble mappings programmatically and by tests
/// exercising the version gate.
#[derive(Debug, Clone, Default)]
pub struct TableMapping {
    version: u32,
    entries: Vec<CompiledProviderEntry>,
}

impl TableMapping {
    /// Empty mapping at the trusted format version.
    pub fn new() -> Self {
        Self {
            version: COMPILED_FORMAT_VERSION,
            entries: Vec::new(),
        }
    }

    /// Empty mapping at an explicit format version.
    pub fn with_version(version: u32) -> Self {
        Self {
            version,
            entries: Vec::new(),
        }
    }

    /// Append a `service -> provider` association.
    pub fn with(mut self, service: ServiceId, provider: ProviderId) -> Self {
        self.entries.push(CompiledProviderEntry { service, provider });
        self
    }
}

impl CompiledMapping for TableMapping {
    fn version(&self) -> u32 {
        self.version
    }

    fn providers(&self, service: ServiceId) -> Vec<ProviderId> {
        self.entries
            .iter()
            .filter(|entry| entry.service == service)
            .map(|entry| entry.provider)
            .collect()
    }
}
