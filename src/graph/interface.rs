//! Capability interfaces and the catalog of their client-exposing properties.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Type names ending with this suffix denote a client capability
pub const CLIENT_SUFFIX: &str = "Client";

/// Stable identity of a capability interface
#[derive(Clone, Copy)]
pub struct InterfaceId {
    type_id: TypeId,
    name: &'static str,
}

impl InterfaceId {
    /// Identity of `T`, usually a `dyn Trait`, under the given short type name
    pub fn of<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for InterfaceId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for InterfaceId {}

impl Hash for InterfaceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterfaceId({})", self.name)
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// `interface_id!(UsersClient)` is `InterfaceId::of::<dyn UsersClient>("UsersClient")`
#[macro_export]
macro_rules! interface_id {
    ($iface:ident) => {
        $crate::graph::InterfaceId::of::<dyn $iface>(stringify!($iface))
    };
}

/// A property declared on an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub readable: bool,
    pub property_type: InterfaceId,
}

impl PropertyDescriptor {
    /// Readable and typed as a client; purely a naming convention
    pub fn exposes_client(&self) -> bool {
        self.readable && self.property_type.name().ends_with(CLIENT_SUFFIX)
    }
}

/// An interface together with the properties it declares
#[derive(Debug, Clone)]
pub struct InterfaceDescriptor {
    pub id: InterfaceId,
    pub properties: Vec<PropertyDescriptor>,
}

impl InterfaceDescriptor {
    pub fn new(id: InterfaceId) -> Self {
        Self {
            id,
            properties: Vec::new(),
        }
    }

    /// Add a readable property
    pub fn property(mut self, name: &'static str, property_type: InterfaceId) -> Self {
        self.properties.push(PropertyDescriptor {
            name,
            readable: true,
            property_type,
        });
        self
    }

    /// Add a property without a getter
    pub fn write_only_property(mut self, name: &'static str, property_type: InterfaceId) -> Self {
        self.properties.push(PropertyDescriptor {
            name,
            readable: false,
            property_type,
        });
        self
    }

    /// Child interfaces reachable through client properties
    pub fn client_children(&self) -> impl Iterator<Item = InterfaceId> + '_ {
        self.properties
            .iter()
            .filter(|p| p.exposes_client())
            .map(|p| p.property_type)
    }
}

/// Adjacency map of every declared interface
#[derive(Debug, Clone, Default)]
pub struct InterfaceCatalog {
    descriptors: HashMap<InterfaceId, InterfaceDescriptor>,
}

impl InterfaceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, descriptor: InterfaceDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    pub fn insert(&mut self, descriptor: InterfaceDescriptor) {
        self.descriptors.insert(descriptor.id, descriptor);
    }

    pub fn get(&self, id: &InterfaceId) -> Option<&InterfaceDescriptor> {
        self.descriptors.get(id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
