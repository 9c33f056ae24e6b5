//! Graph Module
//!
//! Statically declared interface graph, implementation library and the
//! resolver that binds one to the other.

pub mod implementation;
pub mod interface;
pub mod resolver;

pub use implementation::{
    erase, AnyInstance, ApiConnectionConstructor, BoundConstructor, ConnectionConstructor,
    Constructor, ConstructorSignature, ImplementationLibrary, ImplementationType, Visibility,
};
pub use interface::{InterfaceCatalog, InterfaceDescriptor, InterfaceId, PropertyDescriptor};
pub use resolver::{ClientUniverse, ImplementationBinding, ResolutionGraph, ResolutionMode, Resolver};
