//! Service loaders: per-consumer handles over a provider snapshot.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::error::ConfigurationError;
use crate::id::{ProviderId, Service, ServiceId};
use crate::iter::ProviderIterator;
use crate::registry::Registry;

/// One instantiation slot, index-aligned to the provider snapshot.
pub(crate) enum Slot<S: ?Sized> {
    /// Construction not yet attempted.
    Unvisited,
    /// Successfully constructed instance, shared by every iterator over
    /// the same cache.
    Cached(Arc<S>),
    /// Permanently invalid, holding the error it was invalidated with.
    /// Never retried for the lifetime of this cache.
    Invalid(ConfigurationError),
}

/// Arena of instantiation slots shared between a loader and its iterators.
pub(crate) struct InstanceCache<S: ?Sized> {
    slots: Box<[Mutex<Slot<S>>]>,
}

impl<S: ?Sized> InstanceCache<S> {
    pub(crate) fn with_len(len: usize) -> Self {
        Self {
            slots: (0..len).map(|_| Mutex::new(Slot::Unvisited)).collect(),
        }
    }

    /// Lock the slot at `index`.
    ///
    /// Recovers from poisoning instead of panicking: a slot is marked
    /// `Invalid` before its constructor runs, so the state behind a
    /// poisoned lock is still consistent and must stay observable.
    pub(crate) fn lock(&self, index: usize) -> std::sync::MutexGuard<'_, Slot<S>> {
        self.slots[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lazily loads and caches the providers of one service contract.
///
/// A loader snapshots the effective provider list at creation time and
/// shares one instance cache with every iterator it spawns: instances
/// constructed (and slots invalidated) by one iterator are visible to all
/// others over the same loader. [`reload`](ServiceLoader::reload) discards
/// both the snapshot and the cache; it is the only way an existing loader
/// observes providers registered after it was created.
///
/// ```
/// use std::any::TypeId;
/// use std::sync::Arc;
///
/// use spi_core::catalog::{Catalog, ProviderDescriptor, ServiceDescriptor};
/// use spi_core::{ProviderId, Registry, Service, ServiceId, ServiceLoader};
///
/// pub trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// impl Service for dyn Greeter {
///     const ID: ServiceId = ServiceId::from_name("example::Greeter");
/// }
///
/// struct ConsoleGreeter;
///
/// impl Greeter for ConsoleGreeter {
///     fn greet(&self) -> String {
///         "hello".to_owned()
///     }
/// }
///
/// const CONSOLE: ProviderId = ProviderId::from_name("example::ConsoleGreeter");
///
/// fn construct_console() -> Result<Box<dyn std::any::Any + Send + Sync>, spi_core::BoxError> {
///     let instance: Arc<dyn Greeter> = Arc::new(ConsoleGreeter);
///     Ok(Box::new(instance))
/// }
///
/// let catalog = Catalog::new();
/// catalog.define_service(ServiceDescriptor::of::<dyn Greeter>());
/// catalog.define_provider(ProviderDescriptor {
///     provider: CONSOLE,
///     service: <dyn Greeter as Service>::ID,
///     service_type: TypeId::of::<dyn Greeter>,
///     construct: construct_console,
///     requirements: &[],
/// });
///
/// let registry = Arc::new(Registry::new(Arc::new(catalog)));
/// assert!(registry.register(<dyn Greeter as Service>::ID, CONSOLE));
///
/// let loader = ServiceLoader::<dyn Greeter>::load(&registry);
/// assert_eq!(loader.len(), 1);
/// for greeter in &loader {
///     assert_eq!(greeter.unwrap().greet(), "hello");
/// }
/// ```
pub struct ServiceLoader<S: ?Sized> {
    registry: Arc<Registry>,
    service: ServiceId,
    providers: Arc<[ProviderId]>,
    cache: Arc<InstanceCache<S>>,
}

impl<S> ServiceLoader<S>
where
    S: Service + ?Sized + Send + Sync,
{
    /// Snapshot a lazy loader for contract `S` from the given registry.
    ///
    /// Never fails: a service with no providers yields an empty loader.
    pub fn load(registry: &Arc<Registry>) -> Self {
        let registry = Arc::clone(registry);
        let providers: Arc<[ProviderId]> = registry.providers(S::ID).into();
        let cache = Arc::new(InstanceCache::with_len(providers.len()));
        Self {
            registry,
            service: S::ID,
            providers,
            cache,
        }
    }

    /// The service contract this loader is bound to.
    pub fn service(&self) -> ServiceId {
        self.service
    }

    /// Number of candidate providers in the current snapshot.
    ///
    /// Counts candidates, not validated instances: slots invalidated
    /// during iteration still count until the next
    /// [`reload`](ServiceLoader::reload).
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the current snapshot has no candidate providers.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Fresh cursor over the current snapshot, sharing this loader's
    /// instance cache.
    pub fn iter(&self) -> ProviderIterator<S> {
        ProviderIterator::new(
            Arc::clone(self.registry.catalog()),
            self.service,
            Arc::clone(&self.providers),
            Arc::clone(&self.cache),
        )
    }

    /// Discard all cached instances and recompute the provider snapshot
    /// from the registry.
    ///
    /// Iterators obtained before the reload keep the old snapshot and
    /// cache; iterators obtained afterwards see newly registered providers
    /// and construct fresh instances even for providers that had already
    /// been constructed.
    pub fn reload(&mut self) {
        self.providers = self.registry.providers(self.service).into();
        self.cache = Arc::new(InstanceCache::with_len(self.providers.len()));
        debug!(
            service = %self.service,
            candidates = self.providers.len(),
            "reloaded service loader"
        );
    }
}

impl<'a, S> IntoIterator for &'a ServiceLoader<S>
where
    S: Service + ?Sized + Send + Sync,
{
    type Item = Result<Arc<S>, ConfigurationError>;
    type IntoIter = ProviderIterator<S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
