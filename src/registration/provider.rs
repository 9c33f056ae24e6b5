//! Service provider
//!
//! Read-only view over frozen registrations that constructs services on demand.

use crate::error::{OctowireError, Result};
use crate::graph::AnyInstance;
use crate::registration::services::{ServiceDescriptor, ServiceKey, ServiceLifetime, ServiceSource};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub struct ServiceProvider {
    descriptors: Vec<ServiceDescriptor>,

    /// Key to the index of its most recent registration
    index: HashMap<ServiceKey, usize>,

    /// Built singletons by descriptor index
    singletons: Mutex<HashMap<usize, AnyInstance>>,
}

impl ServiceProvider {
    pub(crate) fn new(descriptors: Vec<ServiceDescriptor>) -> Self {
        let index = descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| (d.key().clone(), i))
            .collect();

        Self {
            descriptors,
            index,
            singletons: Mutex::new(HashMap::new()),
        }
    }

    /// Optional lookup; `Ok(None)` when nothing is registered
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>> {
        self.get_named::<T>(None)
    }

    pub fn get_named<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: Option<&str>,
    ) -> Result<Option<Arc<T>>> {
        let key = ServiceKey::of::<T>(name);
        match self.resolve_key(&key)? {
            Some(instance) => downcast::<T>(&key, instance).map(Some),
            None => Ok(None),
        }
    }

    /// Lookup that fails with [`OctowireError::MissingService`] when nothing is registered
    pub fn get_required<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.get_required_named::<T>(None)
    }

    pub fn get_required_named<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: Option<&str>,
    ) -> Result<Arc<T>> {
        self.get_named::<T>(name)?
            .ok_or_else(|| OctowireError::MissingService {
                service: std::any::type_name::<T>(),
                name: name.map(str::to_string),
            })
    }

    /// Construct the service registered under `key`, untyped
    pub fn resolve_key(&self, key: &ServiceKey) -> Result<Option<AnyInstance>> {
        match self.index.get(key) {
            Some(&index) => self.instantiate(index).map(Some),
            None => Ok(None),
        }
    }

    pub fn contains_key(&self, key: &ServiceKey) -> bool {
        self.index.contains_key(key)
    }

    fn instantiate(&self, index: usize) -> Result<AnyInstance> {
        let descriptor = &self.descriptors[index];
        let factory = match &descriptor.source {
            ServiceSource::Instance(instance) => return Ok(instance.clone()),
            ServiceSource::Factory(factory) => factory,
        };

        if descriptor.lifetime() == ServiceLifetime::Transient {
            return factory(self);
        }

        if let Some(existing) = self.singletons.lock().get(&index).cloned() {
            return Ok(existing);
        }

        // Built outside the lock so the factory may resolve other services
        let built = factory(self)?;
        Ok(self
            .singletons
            .lock()
            .entry(index)
            .or_insert(built)
            .clone())
    }
}

fn downcast<T: ?Sized + Send + Sync + 'static>(key: &ServiceKey, instance: AnyInstance) -> Result<Arc<T>> {
    instance
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or_else(|| {
            OctowireError::Internal(format!(
                "Service '{}' produced an instance of an unexpected type",
                key.type_name()
            ))
        })
}
