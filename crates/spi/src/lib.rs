//! # SPI - Service Provider Interface for Rust
//!
//! Service-provider discovery and lazy instantiation: declare a contract
//! as a trait object type with a stable identity, register concrete
//! implementations for it (at link time through distributed slices or at
//! runtime through [`register`]), and load them lazily through a
//! [`ServiceLoader`].
//!
//! This crate is the user-facing surface: it re-exports the whole
//! [`spi_core`] API and owns the process-wide default [`Registry`], wired
//! to the link-time descriptor catalog and compiled mapping.
//!
//! ## Usage
//!
//! ```ignore
//! use spi::{Service, ServiceId, ProviderId};
//!
//! pub trait Exporter: Send + Sync {
//!     fn export(&self, payload: &str);
//! }
//!
//! impl Service for dyn Exporter {
//!     const ID: ServiceId = ServiceId::from_name("app::Exporter");
//! }
//!
//! // Providers contribute descriptors (and optionally compiled-mapping
//! // entries) from any crate in the dependency graph:
//! #[linkme::distributed_slice(spi::PROVIDERS)]
//! static STDOUT_EXPORTER: spi::ProviderDescriptor = /* ... */;
//!
//! // Consumers iterate lazily; invalid providers are surfaced once and
//! // then skipped:
//! for exporter in &spi::load::<dyn Exporter>() {
//!     exporter?.export("hello");
//! }
//! ```
//!
//! Tests that need isolation should construct their own
//! [`Registry`]/[`Catalog`](spi_core::Catalog) instead of going through
//! the process-wide one.

use std::sync::{Arc, LazyLock};

pub use spi_core::*;

static GLOBAL: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::linked()));

/// The process-wide registry.
///
/// Constructed once, on first use, from the link-time descriptor catalog
/// and compiled mapping; lives for the process lifetime.
pub fn registry() -> Arc<Registry> {
    Arc::clone(&GLOBAL)
}

/// Register a provider implementation for a service contract on the
/// process-wide registry.
///
/// Returns whether the provider is available: `true` if it was registered
/// (or already was), `false` if either identity does not resolve or one of
/// the provider's requirements is unsatisfied. Loaders created before this
/// call do not see the new provider until they
/// [`reload`](ServiceLoader::reload).
pub fn register(service: ServiceId, provider: ProviderId) -> bool {
    GLOBAL.register(service, provider)
}

/// Lazily load the providers of contract `S` from the process-wide
/// registry.
///
/// Never fails; a contract with no providers yields an empty loader.
pub fn load<S>() -> ServiceLoader<S>
where
    S: Service + ?Sized + Send + Sync,
{
    ServiceLoader::load(&GLOBAL)
}
