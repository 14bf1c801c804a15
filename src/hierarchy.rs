//! Event type hierarchy for eventgraph
//!
//! Provides `TypeHierarchyBuilder` and the compiled `TypeHierarchy`: an
//! explicit, statically declared "is-a" graph of event types. A type with no
//! subtypes is concrete; a type with one or more subtypes is abstract and
//! only ever used as a subscription target covering its whole family.
//!
//! The hierarchy is built once at startup and never changes afterwards.

use petgraph::algo::toposort;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::Dfs;
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::error::HierarchyError;
use crate::events::EventType;

/// Declarative form of a hierarchy: each category mapped to its direct subtypes
///
/// Deserializes from a JSON object such as
/// `{"Event": ["ManagementEvent"], "ManagementEvent": ["FaultEvent"]}`.
pub type HierarchyTable = BTreeMap<String, Vec<String>>;

/// Builder for constructing a type hierarchy
#[derive(Default)]
pub struct TypeHierarchyBuilder {
    types: Vec<EventType>,
    edges: Vec<(EventType, EventType)>,
}

impl TypeHierarchyBuilder {
    /// Create a new hierarchy builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type with no subtypes (yet)
    pub fn add_type(mut self, tag: impl Into<EventType>) -> Self {
        self.types.push(tag.into());
        self
    }

    /// Declare `child` as a direct subtype of `parent`
    ///
    /// Both types are registered if they are not already known. A type may
    /// have several parents.
    pub fn add_subtype(mut self, parent: impl Into<EventType>, child: impl Into<EventType>) -> Self {
        self.edges.push((parent.into(), child.into()));
        self
    }

    /// Declare every entry of `children` as a direct subtype of `parent`
    pub fn add_category<I, T>(mut self, parent: impl Into<EventType>, children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<EventType>,
    {
        let parent = parent.into();
        self.types.push(parent.clone());
        for child in children {
            self.edges.push((parent.clone(), child.into()));
        }
        self
    }

    /// Compile the hierarchy, rejecting self references and cycles
    pub fn compile(self) -> Result<TypeHierarchy, HierarchyError> {
        let mut graph = StableGraph::new();
        let mut node_indices: HashMap<EventType, NodeIndex> = HashMap::new();

        let mut index_of = |graph: &mut StableGraph<EventType, ()>, tag: &EventType| {
            *node_indices
                .entry(tag.clone())
                .or_insert_with(|| graph.add_node(tag.clone()))
        };

        for tag in &self.types {
            index_of(&mut graph, tag);
        }

        for (parent, child) in &self.edges {
            if parent == child {
                return Err(HierarchyError::SelfReference(parent.to_string()));
            }
            let from = index_of(&mut graph, parent);
            let to = index_of(&mut graph, child);
            graph.update_edge(from, to, ());
        }

        if let Err(cycle) = toposort(&graph, None) {
            return Err(HierarchyError::CycleDetected(graph[cycle.node_id()].to_string()));
        }

        Ok(TypeHierarchy {
            graph,
            node_indices,
        })
    }
}

/// A compiled, immutable event type hierarchy
#[derive(Clone)]
pub struct TypeHierarchy {
    graph: StableGraph<EventType, ()>,
    node_indices: HashMap<EventType, NodeIndex>,
}

impl TypeHierarchy {
    /// Start building a hierarchy
    pub fn builder() -> TypeHierarchyBuilder {
        TypeHierarchyBuilder::new()
    }

    /// Build a hierarchy from a parent → children table
    pub fn from_table(table: &HierarchyTable) -> Result<Self, HierarchyError> {
        table
            .iter()
            .fold(TypeHierarchyBuilder::new(), |builder, (parent, children)| {
                builder.add_category(parent.as_str(), children.iter().map(String::as_str))
            })
            .compile()
    }

    /// Resolve a tag to the set of concrete types it covers
    ///
    /// A concrete tag resolves to itself. An abstract tag resolves to every
    /// concrete type reachable through its subtypes; intermediate abstract
    /// types are not part of the result. An unknown tag resolves to the
    /// empty set.
    pub fn leaf_descendants(&self, tag: &str) -> BTreeSet<EventType> {
        let Some(&start) = self.node_indices.get(tag) else {
            return BTreeSet::new();
        };

        let mut leaves = BTreeSet::new();
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(idx) = dfs.next(&self.graph) {
            if self.is_leaf(idx) {
                leaves.insert(self.graph[idx].clone());
            }
        }
        leaves
    }

    /// Check whether a tag is registered
    pub fn contains(&self, tag: &str) -> bool {
        self.node_indices.contains_key(tag)
    }

    /// Check whether a tag is registered and has no subtypes
    pub fn is_concrete(&self, tag: &str) -> bool {
        self.node_indices
            .get(tag)
            .is_some_and(|idx| self.is_leaf(*idx))
    }

    /// Check whether a tag is registered and has at least one subtype
    pub fn is_abstract(&self, tag: &str) -> bool {
        self.node_indices
            .get(tag)
            .is_some_and(|idx| !self.is_leaf(*idx))
    }

    /// Direct subtypes of a tag, sorted by name
    pub fn children(&self, tag: &str) -> Vec<EventType> {
        let Some(&idx) = self.node_indices.get(tag) else {
            return Vec::new();
        };
        let mut children: Vec<EventType> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|child| self.graph[child].clone())
            .collect();
        children.sort();
        children
    }

    /// Every concrete type in the hierarchy
    pub fn concrete_types(&self) -> BTreeSet<EventType> {
        self.graph
            .node_indices()
            .filter(|idx| self.is_leaf(*idx))
            .map(|idx| self.graph[idx].clone())
            .collect()
    }

    /// Number of registered types, abstract and concrete
    pub fn len(&self) -> usize {
        self.node_indices.len()
    }

    /// Check whether no types are registered
    pub fn is_empty(&self) -> bool {
        self.node_indices.is_empty()
    }

    /// Generate a Mermaid diagram of the hierarchy
    pub fn to_mermaid(&self) -> String {
        let mut output = String::from("graph TD\n");

        let mut tags: Vec<&EventType> = self.node_indices.keys().collect();
        tags.sort();

        for tag in &tags {
            let id = mermaid_id(tag);
            if self.is_concrete(tag.as_str()) {
                output.push_str(&format!("    {}[{}]\n", id, tag));
            } else {
                output.push_str(&format!("    {}([{}])\n", id, tag));
            }
        }

        for tag in &tags {
            for child in self.children(tag.as_str()) {
                output.push_str(&format!("    {} --> {}\n", mermaid_id(tag), mermaid_id(&child)));
            }
        }

        output
    }

    fn is_leaf(&self, idx: NodeIndex) -> bool {
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .next()
            .is_none()
    }
}

impl fmt::Debug for TypeHierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeHierarchy")
            .field("types", &self.len())
            .field("concrete", &self.concrete_types().len())
            .finish()
    }
}

fn mermaid_id(tag: &EventType) -> String {
    tag.as_str().replace(['-', ' ', '.'], "_")
}
