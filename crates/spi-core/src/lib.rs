//! # SPI Core - service-provider discovery and lazy instantiation
//!
//! Core engine of the SPI facility: given a service contract (a trait
//! object type with a stable identity), locate the provider
//! implementations registered for it and construct them lazily, caching
//! successes and permanently skipping failures.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Provider Loading Flow                     │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  CompiledMapping (link time)      Registry (runtime)             │
//! │  ───────────────────────────      ──────────────────             │
//! │  COMPILED_PROVIDERS entries  ──▶  register() / providers()       │
//! │                                          │                       │
//! │                                          ▼  snapshot             │
//! │                                   ServiceLoader<S>               │
//! │                                          │                       │
//! │                                          ▼  shared cache         │
//! │                                   ProviderIterator<S>            │
//! │                                          │                       │
//! │   Catalog (descriptor table) ◀── construct + validate per slot   │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`Catalog`] is the registered-type-descriptor table: it makes
//!   identities resolvable and holds each provider's zero-argument
//!   constructor handle, declared contract, and requirements.
//! - [`Registry`] maps service identities to ordered provider lists,
//!   merging runtime registrations with the versioned, read-only
//!   [`CompiledMapping`].
//! - [`ServiceLoader`] snapshots the effective provider list for one
//!   contract and shares an instance cache with every iterator it spawns.
//! - [`ProviderIterator`] is the slot state machine: construct on first
//!   visit, cache successes, invalidate failures permanently, surface each
//!   failure exactly once.
//!
//! All operations are synchronous and perform no I/O.

pub mod catalog;
pub mod compiled;
pub mod error;
pub mod id;
pub mod iter;
pub mod loader;
pub mod registry;
pub mod requirement;

pub use catalog::{Catalog, ConstructFn, ProviderDescriptor, ServiceDescriptor, PROVIDERS, SERVICES};
pub use compiled::{
    CompiledMapping, CompiledProviderEntry, LinkedMapping, TableMapping, COMPILED_FORMAT_VERSION,
    COMPILED_PROVIDERS,
};
pub use error::{BoxError, ConfigurationError, Result};
pub use id::{ProviderId, Service, ServiceId};
pub use iter::ProviderIterator;
pub use loader::ServiceLoader;
pub use registry::Registry;
pub use requirement::{capability_version, declare_capability, CapabilityConstraint, Requirement};
