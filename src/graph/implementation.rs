//! Implementation types and their construction paths.

use crate::connection::{ApiConnection, Connection};
use crate::graph::interface::InterfaceId;
use std::any::Any;
use std::sync::Arc;

/// Type-erased constructed service; always holds an `Arc<T>` for the service type `T`
pub type AnyInstance = Arc<dyn Any + Send + Sync>;

/// Erase a service instance so it can be stored next to unrelated services
pub fn erase<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) -> AnyInstance {
    Arc::new(instance)
}

pub type ApiConnectionConstructor = fn(Arc<dyn ApiConnection>) -> AnyInstance;
pub type ConnectionConstructor = fn(Arc<dyn Connection>) -> AnyInstance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Internal,
}

/// Parameter list of a constructor
#[derive(Debug, Clone, Copy)]
pub enum ConstructorSignature {
    /// Exactly one `ApiConnection` parameter
    ApiConnection(ApiConnectionConstructor),

    /// Exactly one `Connection` parameter
    Connection(ConnectionConstructor),

    /// Any other parameter list, by parameter type name
    Other(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct Constructor {
    pub visibility: Visibility,
    pub signature: ConstructorSignature,
}

/// Construction path selected for a binding
#[derive(Debug, Clone, Copy)]
pub enum BoundConstructor {
    ApiConnection(ApiConnectionConstructor),
    Connection(ConnectionConstructor),
}

impl BoundConstructor {
    /// Name of the single parameter type
    pub fn parameter(&self) -> &'static str {
        match self {
            BoundConstructor::ApiConnection(_) => "ApiConnection",
            BoundConstructor::Connection(_) => "Connection",
        }
    }
}

/// A concrete type that may implement capability interfaces
#[derive(Debug, Clone)]
pub struct ImplementationType {
    pub name: &'static str,
    pub visibility: Visibility,
    pub is_abstract: bool,
    pub implements: Vec<InterfaceId>,
    pub constructors: Vec<Constructor>,
}

impl ImplementationType {
    /// A public, concrete type with no interfaces or constructors yet
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            visibility: Visibility::Public,
            is_abstract: false,
            implements: Vec::new(),
            constructors: Vec::new(),
        }
    }

    pub fn internal(mut self) -> Self {
        self.visibility = Visibility::Internal;
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn implements(mut self, interface: InterfaceId) -> Self {
        self.implements.push(interface);
        self
    }

    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Add a public constructor taking an `ApiConnection`
    pub fn api_connection_constructor(self, ctor: ApiConnectionConstructor) -> Self {
        self.constructor(Constructor {
            visibility: Visibility::Public,
            signature: ConstructorSignature::ApiConnection(ctor),
        })
    }

    /// Add a public constructor taking a `Connection`
    pub fn connection_constructor(self, ctor: ConnectionConstructor) -> Self {
        self.constructor(Constructor {
            visibility: Visibility::Public,
            signature: ConstructorSignature::Connection(ctor),
        })
    }

    /// Public, non-abstract and implementing `interface`
    pub fn is_candidate_for(&self, interface: &InterfaceId) -> bool {
        self.visibility == Visibility::Public
            && !self.is_abstract
            && self.implements.contains(interface)
    }

    /// Public `ApiConnection` constructor, falling back to a public `Connection` one
    pub fn eligible_constructor(&self) -> Option<BoundConstructor> {
        let public = || {
            self.constructors
                .iter()
                .filter(|c| c.visibility == Visibility::Public)
        };

        public()
            .find_map(|c| match c.signature {
                ConstructorSignature::ApiConnection(ctor) => {
                    Some(BoundConstructor::ApiConnection(ctor))
                }
                _ => None,
            })
            .or_else(|| {
                public().find_map(|c| match c.signature {
                    ConstructorSignature::Connection(ctor) => Some(BoundConstructor::Connection(ctor)),
                    _ => None,
                })
            })
    }
}

/// Every implementation type available for binding
#[derive(Debug, Clone, Default)]
pub struct ImplementationLibrary {
    types: Vec<ImplementationType>,
}

impl ImplementationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, implementation: ImplementationType) -> Self {
        self.push(implementation);
        self
    }

    pub fn push(&mut self, implementation: ImplementationType) {
        self.types.push(implementation);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImplementationType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface_id;

    trait GadgetsClient: Send + Sync {}
    trait OtherClient {}

    struct Gadgets;
    impl GadgetsClient for Gadgets {}

    fn from_api(_: Arc<dyn ApiConnection>) -> AnyInstance {
        erase::<dyn GadgetsClient>(Arc::new(Gadgets))
    }

    fn from_connection(_: Arc<dyn Connection>) -> AnyInstance {
        erase::<dyn GadgetsClient>(Arc::new(Gadgets))
    }

    #[test]
    fn test_candidate_rules() {
        let id = interface_id!(GadgetsClient);
        let public = ImplementationType::new("Gadgets").implements(id);
        assert!(public.is_candidate_for(&id));
        assert!(!public.is_candidate_for(&interface_id!(OtherClient)));
        assert!(!public.clone().internal().is_candidate_for(&id));
        assert!(!public.abstract_type().is_candidate_for(&id));
    }

    #[test]
    fn test_prefers_api_connection_constructor() {
        let both = ImplementationType::new("Gadgets")
            .connection_constructor(from_connection)
            .api_connection_constructor(from_api);
        assert_eq!(
            both.eligible_constructor().map(|c| c.parameter()),
            Some("ApiConnection")
        );

        let low_level = ImplementationType::new("Gadgets").connection_constructor(from_connection);
        assert_eq!(
            low_level.eligible_constructor().map(|c| c.parameter()),
            Some("Connection")
        );
    }

    #[test]
    fn test_ignores_other_and_non_public_constructors() {
        let implementation = ImplementationType::new("Gadgets")
            .constructor(Constructor {
                visibility: Visibility::Public,
                signature: ConstructorSignature::Other(&["ApiConnection", "Credentials"]),
            })
            .constructor(Constructor {
                visibility: Visibility::Internal,
                signature: ConstructorSignature::ApiConnection(from_api),
            });
        assert!(implementation.eligible_constructor().is_none());
    }

    #[test]
    fn test_erased_instance_downcasts_to_arc() {
        let instance = erase::<dyn GadgetsClient>(Arc::new(Gadgets));
        assert!(instance.downcast_ref::<Arc<dyn GadgetsClient>>().is_some());
        assert!(instance.downcast_ref::<Arc<Gadgets>>().is_none());
    }
}
