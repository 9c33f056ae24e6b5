//! Service registrations
//!
//! An ordered list of constructors keyed by service type and an optional name.

use crate::error::Result;
use crate::graph::{erase, AnyInstance, InterfaceId};
use crate::registration::provider::ServiceProvider;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub type ServiceFactory = Arc<dyn Fn(&ServiceProvider) -> Result<AnyInstance> + Send + Sync>;

/// Identifies a service by type and optional discriminator name
#[derive(Debug, Clone)]
pub struct ServiceKey {
    type_id: TypeId,
    type_name: &'static str,
    name: Option<String>,
}

impl ServiceKey {
    pub fn of<T: ?Sized + 'static>(name: Option<&str>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            name: name.map(str::to_string),
        }
    }

    /// Unnamed key of a capability interface
    pub fn for_interface(interface: InterfaceId) -> Self {
        Self {
            type_id: interface.type_id(),
            type_name: interface.name(),
            name: None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLifetime {
    /// Built once per provider
    Singleton,

    /// Built on every lookup
    Transient,
}

#[derive(Clone)]
pub(crate) enum ServiceSource {
    Instance(AnyInstance),
    Factory(ServiceFactory),
}

/// One registration
#[derive(Clone)]
pub struct ServiceDescriptor {
    key: ServiceKey,
    lifetime: ServiceLifetime,
    pub(crate) source: ServiceSource,
}

impl ServiceDescriptor {
    /// Singleton backed by an existing instance
    pub fn instance(key: ServiceKey, instance: AnyInstance) -> Self {
        Self {
            key,
            lifetime: ServiceLifetime::Singleton,
            source: ServiceSource::Instance(instance),
        }
    }

    /// Singleton built lazily on first lookup
    pub fn singleton(key: ServiceKey, factory: ServiceFactory) -> Self {
        Self {
            key,
            lifetime: ServiceLifetime::Singleton,
            source: ServiceSource::Factory(factory),
        }
    }

    pub fn transient(key: ServiceKey, factory: ServiceFactory) -> Self {
        Self {
            key,
            lifetime: ServiceLifetime::Transient,
            source: ServiceSource::Factory(factory),
        }
    }

    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    pub fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            ServiceSource::Instance(_) => "instance",
            ServiceSource::Factory(_) => "factory",
        };
        f.debug_struct("ServiceDescriptor")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("source", &source)
            .finish()
    }
}

fn typed_factory<T, F>(factory: F) -> ServiceFactory
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(&ServiceProvider) -> Result<Arc<T>> + Send + Sync + 'static,
{
    Arc::new(move |provider: &ServiceProvider| factory(provider).map(erase::<T>))
}

/// Mutable registration target, configured once on a single thread
#[derive(Debug, Clone, Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a registration; the last one for a key is what lookups return
    pub fn add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Append only if nothing is registered under the key yet
    pub fn try_add(&mut self, descriptor: ServiceDescriptor) -> bool {
        if self.contains_key(descriptor.key()) {
            return false;
        }
        self.descriptors.push(descriptor);
        true
    }

    pub fn add_singleton<T>(&mut self, instance: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::instance(ServiceKey::of::<T>(None), erase(instance)))
    }

    pub fn try_add_singleton<T>(&mut self, instance: Arc<T>) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.try_add(ServiceDescriptor::instance(ServiceKey::of::<T>(None), erase(instance)))
    }

    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.add_named_singleton_factory(None, factory)
    }

    pub fn add_named_singleton_factory<T, F>(&mut self, name: Option<&str>, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::singleton(
            ServiceKey::of::<T>(name),
            typed_factory(factory),
        ))
    }

    pub fn add_transient<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::transient(
            ServiceKey::of::<T>(None),
            typed_factory(factory),
        ))
    }

    pub fn try_add_transient<T, F>(&mut self, factory: F) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>> + Send + Sync + 'static,
    {
        self.try_add(ServiceDescriptor::transient(
            ServiceKey::of::<T>(None),
            typed_factory(factory),
        ))
    }

    pub fn contains_key(&self, key: &ServiceKey) -> bool {
        self.descriptors.iter().any(|d| d.key() == key)
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.contains_named::<T>(None)
    }

    pub fn contains_named<T: ?Sized + 'static>(&self, name: Option<&str>) -> bool {
        self.contains_key(&ServiceKey::of::<T>(name))
    }

    /// Number of registrations under a key
    pub fn count(&self, key: &ServiceKey) -> usize {
        self.descriptors.iter().filter(|d| d.key() == key).count()
    }

    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Freeze the registrations into a provider
    pub fn build_provider(self) -> ServiceProvider {
        ServiceProvider::new(self.descriptors)
    }
}
