//! Client Graph Resolver
//!
//! Walks the interface graph from a root interface and binds every reachable
//! interface to its single eligible implementation.

use crate::error::{OctowireError, Result};
use crate::graph::implementation::{BoundConstructor, ImplementationLibrary};
use crate::graph::interface::{InterfaceCatalog, InterfaceId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// How an interface without an eligible implementation is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Zero or several eligible implementations fail the resolution
    #[default]
    Strict,

    /// Zero eligible implementations leaves the interface unbound; several still fail
    Lenient,
}

/// An interface paired with the implementation that constructs it
#[derive(Debug, Clone, Copy)]
pub struct ImplementationBinding {
    pub interface: InterfaceId,
    pub implementation: &'static str,
    pub constructor: BoundConstructor,
}

/// Result of a resolution run
#[derive(Debug, Clone, Default)]
pub struct ResolutionGraph {
    visited: Vec<InterfaceId>,
    bindings: Vec<ImplementationBinding>,
    index: HashMap<InterfaceId, usize>,
    unbound: Vec<InterfaceId>,
}

impl ResolutionGraph {
    /// Bindings in discovery order
    pub fn bindings(&self) -> &[ImplementationBinding] {
        &self.bindings
    }

    pub fn binding(&self, interface: &InterfaceId) -> Option<&ImplementationBinding> {
        self.index.get(interface).map(|&i| &self.bindings[i])
    }

    /// Every interface the traversal reached, in discovery order
    pub fn visited(&self) -> &[InterfaceId] {
        &self.visited
    }

    /// Interfaces reached without an eligible implementation (lenient mode only)
    pub fn unbound(&self) -> &[InterfaceId] {
        &self.unbound
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn push_binding(&mut self, binding: ImplementationBinding) {
        self.index.insert(binding.interface, self.bindings.len());
        self.bindings.push(binding);
    }
}

/// Depth-first resolver over a catalog and an implementation library
pub struct Resolver<'a> {
    catalog: &'a InterfaceCatalog,
    library: &'a ImplementationLibrary,
    mode: ResolutionMode,
}

impl<'a> Resolver<'a> {
    pub fn new(
        catalog: &'a InterfaceCatalog,
        library: &'a ImplementationLibrary,
        mode: ResolutionMode,
    ) -> Self {
        Self {
            catalog,
            library,
            mode,
        }
    }

    pub fn resolve(&self, root: InterfaceId) -> Result<ResolutionGraph> {
        let mut graph = ResolutionGraph::default();
        let mut known = HashSet::new();
        self.visit(root, &mut known, &mut graph)?;

        debug!(
            root = root.name(),
            visited = graph.visited.len(),
            bound = graph.bindings.len(),
            unbound = graph.unbound.len(),
            "Resolved client graph"
        );
        Ok(graph)
    }

    fn visit(
        &self,
        interface: InterfaceId,
        known: &mut HashSet<InterfaceId>,
        graph: &mut ResolutionGraph,
    ) -> Result<()> {
        if !known.insert(interface) {
            return Ok(());
        }
        graph.visited.push(interface);

        match self.find_implementation(interface)? {
            Some(binding) => graph.push_binding(binding),
            None => graph.unbound.push(interface),
        }

        let Some(descriptor) = self.catalog.get(&interface) else {
            trace!(interface = interface.name(), "Interface declares no properties");
            return Ok(());
        };

        for child in descriptor.client_children() {
            self.visit(child, known, graph)?;
        }
        Ok(())
    }

    fn find_implementation(&self, interface: InterfaceId) -> Result<Option<ImplementationBinding>> {
        let eligible: Vec<_> = self
            .library
            .iter()
            .filter(|t| t.is_candidate_for(&interface))
            .filter_map(|t| t.eligible_constructor().map(|ctor| (t.name, ctor)))
            .collect();

        match eligible.as_slice() {
            [(name, constructor)] => {
                trace!(
                    interface = interface.name(),
                    implementation = *name,
                    parameter = constructor.parameter(),
                    "Bound interface"
                );
                Ok(Some(ImplementationBinding {
                    interface,
                    implementation: *name,
                    constructor: *constructor,
                }))
            }
            [] => match self.mode {
                ResolutionMode::Strict => Err(OctowireError::MissingImplementation {
                    interface: interface.name(),
                }),
                ResolutionMode::Lenient => {
                    debug!(interface = interface.name(), "No eligible implementation, skipping");
                    Ok(None)
                }
            },
            many => Err(OctowireError::AmbiguousImplementation {
                interface: interface.name(),
                candidates: many.iter().map(|(name, _)| *name).collect(),
            }),
        }
    }
}

/// The root interface together with everything needed to resolve it
#[derive(Debug, Clone)]
pub struct ClientUniverse {
    pub root: InterfaceId,
    pub catalog: InterfaceCatalog,
    pub library: ImplementationLibrary,
}

impl ClientUniverse {
    pub fn new(root: InterfaceId, catalog: InterfaceCatalog, library: ImplementationLibrary) -> Self {
        Self {
            root,
            catalog,
            library,
        }
    }

    pub fn resolve(&self, mode: ResolutionMode) -> Result<ResolutionGraph> {
        Resolver::new(&self.catalog, &self.library, mode).resolve(self.root)
    }
}
