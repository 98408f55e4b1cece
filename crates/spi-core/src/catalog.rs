//! Descriptor catalog: the registered-type-descriptor table.
//!
//! The catalog is what makes an identity *resolvable*: a service identity
//! resolves when a [`ServiceDescriptor`] for it is present, a provider
//! identity resolves when a [`ProviderDescriptor`] is. Descriptors arrive
//! two ways:
//!
//! 1. Submitted at link time through the [`SERVICES`] / [`PROVIDERS`]
//!    distributed slices - any crate in the dependency graph contributes
//!    entries and the linker collects them:
//!
//!    ```ignore
//!    #[linkme::distributed_slice(spi_core::PROVIDERS)]
//!    static FS_INDEXER: ProviderDescriptor = ProviderDescriptor {
//!        provider: ProviderId::from_name("app::FsIndexer"),
//!        service: <dyn Indexer as Service>::ID,
//!        service_type: TypeId::of::<dyn Indexer>,
//!        construct: construct_fs_indexer,
//!        requirements: &[],
//!    };
//!    ```
//!
//! 2. Defined at runtime with [`Catalog::define_service`] /
//!    [`Catalog::define_provider`] - used by tests and by hosts that build
//!    their descriptor table dynamically.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::BoxError;
use crate::id::{ProviderId, Service, ServiceId};
use crate::requirement::Requirement;

/// Zero-argument constructor handle.
///
/// Returns a boxed `Arc<S>` where `S` is the provider's declared contract;
/// the iterator downcasts the box back to `Arc<S>` after checking the
/// declared type.
pub type ConstructFn = fn() -> std::result::Result<Box<dyn Any + Send + Sync>, BoxError>;

/// Descriptor making a service contract resolvable.
#[derive(Clone, Copy)]
pub struct ServiceDescriptor {
    /// Identity of the contract.
    pub service: ServiceId,
    /// Type identity of the contract's dyn type.
    pub service_type: fn() -> TypeId,
}

impl ServiceDescriptor {
    /// Descriptor for contract `S`.
    pub fn of<S: Service + ?Sized>() -> Self {
        Self {
            service: S::ID,
            service_type: TypeId::of::<S>,
        }
    }
}

/// Descriptor making a provider implementation resolvable and
/// constructible.
#[derive(Clone, Copy)]
pub struct ProviderDescriptor {
    /// Identity of the implementation.
    pub provider: ProviderId,
    /// The contract this implementation is declared for.
    pub service: ServiceId,
    /// Type identity of the declared contract's dyn type.
    pub service_type: fn() -> TypeId,
    /// Zero-argument constructor handle.
    pub construct: ConstructFn,
    /// Requirements evaluated at registration time.
    pub requirements: &'static [&'static dyn Requirement],
}

/// Link-time service descriptors.
#[linkme::distributed_slice]
pub static SERVICES: [ServiceDescriptor] = [..];

/// Link-time provider descriptors.
#[linkme::distributed_slice]
pub static PROVIDERS: [ProviderDescriptor] = [..];

/// The registered-type-descriptor table.
pub struct Catalog {
    services: RwLock<HashMap<ServiceId, ServiceDescriptor>>,
    providers: RwLock<HashMap<ProviderId, ProviderDescriptor>>,
}

impl Catalog {
    /// Empty catalog. Descriptors are defined at runtime by the host.
    pub fn new() -> Self {
        Self {
            services: RwLock::new(HashMap::new()),
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// Catalog populated from the link-time distributed slices.
    pub fn linked() -> Self {
        let catalog = Self::new();
        for descriptor in SERVICES.iter() {
            catalog.define_service(*descriptor);
        }
        for descriptor in PROVIDERS.iter() {
            catalog.define_provider(*descriptor);
        }
        catalog
    }

    /// Make a service contract resolvable.
    ///
    /// A later descriptor for the same identity replaces the earlier one.
    pub fn define_service(&self, descriptor: ServiceDescriptor) {
        self.services
            .write()
            .expect("lock poisoned")
            .insert(descriptor.service, descriptor);
    }

    /// Make a provider implementation resolvable.
    pub fn define_provider(&self, descriptor: ProviderDescriptor) {
        self.providers
            .write()
            .expect("lock poisoned")
            .insert(descriptor.provider, descriptor);
    }

    /// Whether the service identity resolves to a known contract.
    pub fn service_resolvable(&self, service: ServiceId) -> bool {
        self.services
            .read()
            .expect("lock poisoned")
            .contains_key(&service)
    }

    /// Descriptor for the given provider identity, if resolvable.
    pub fn provider(&self, provider: ProviderId) -> Option<ProviderDescriptor> {
        self.providers
            .read()
            .expect("lock poisoned")
            .get(&provider)
            .copied()
    }

    /// Whether the provider identity resolves and all of its requirements
    /// are currently satisfied.
    ///
    /// Requirements are evaluated on every call, never cached.
    pub fn provider_available(&self, provider: ProviderId) -> bool {
        let Some(descriptor) = self.provider(provider) else {
            return false;
        };
        descriptor
            .requirements
            .iter()
            .all(|requirement| requirement.is_satisfied())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
