//! The immutable per-module logic tree.
//!
//! A `LogicTree` owns every node of one module, keyed by node ID, with the
//! root set computed at construction. Construction is the load-time
//! integrity gate: duplicate IDs, foreign owners, and dangling parent or
//! child references are surfaced as `LoadError`, never silently dropped.
//! After construction the tree is read-only; concurrent queries need no
//! locking.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::LoadError;
use crate::node::{ModuleId, NodeId, RuleNode};

/// Direction of a tree traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalDirection {
    /// Follow parent links.
    Up,
    /// Follow child links.
    Down,
    /// Follow both.
    Both,
}

/// The owned forest of one reasoning module.
#[derive(Debug, Clone)]
pub struct LogicTree {
    module_id: ModuleId,
    nodes: HashMap<NodeId, RuleNode>,
    roots: Vec<NodeId>,
}

impl LogicTree {
    /// Builds a tree from fixture nodes, validating integrity.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` on the first duplicate node ID, node owned by a
    /// different module, per-node validation failure, or dangling
    /// parent/child reference.
    pub fn from_nodes(
        module_id: impl Into<ModuleId>,
        fixture: Vec<RuleNode>,
    ) -> Result<Self, LoadError> {
        let module_id = module_id.into();
        let mut nodes: HashMap<NodeId, RuleNode> = HashMap::with_capacity(fixture.len());

        for node in fixture {
            if node.module_id != module_id {
                return Err(LoadError::ForeignNode {
                    node_id: node.node_id,
                    expected: module_id,
                    actual: node.module_id,
                });
            }
            if nodes.contains_key(&node.node_id) {
                return Err(LoadError::DuplicateNode {
                    node_id: node.node_id,
                    module_id,
                });
            }
            nodes.insert(node.node_id.clone(), node);
        }

        // Full validation pass before the tree becomes usable.
        for node in nodes.values() {
            let errors = validate_node_against(node, &nodes);
            if !errors.is_empty() {
                return Err(LoadError::InvalidNode {
                    node_id: node.node_id.clone(),
                    errors,
                });
            }
        }

        let mut roots: Vec<NodeId> = nodes
            .values()
            .filter(|n| n.parent_id.is_none())
            .map(|n| n.node_id.clone())
            .collect();
        roots.sort();

        Ok(Self {
            module_id,
            nodes,
            roots,
        })
    }

    /// The module that owns this tree.
    #[must_use]
    pub fn module_id(&self) -> &ModuleId {
        &self.module_id
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root node IDs (no parent), sorted for determinism.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Looks up a node by ID.
    #[must_use]
    pub fn get(&self, node_id: &NodeId) -> Option<&RuleNode> {
        self.nodes.get(node_id)
    }

    /// All nodes, in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = &RuleNode> {
        self.nodes.values()
    }

    /// Children of a node, in the node's declared order.
    #[must_use]
    pub fn children(&self, node_id: &NodeId) -> Vec<&RuleNode> {
        let Some(node) = self.get(node_id) else {
            return Vec::new();
        };
        node.children_ids
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Parent of a node, if any.
    #[must_use]
    pub fn parent(&self, node_id: &NodeId) -> Option<&RuleNode> {
        self.get(node_id)
            .and_then(|n| n.parent_id.as_ref())
            .and_then(|id| self.nodes.get(id))
    }

    /// Breadth-first traversal from a starting node.
    ///
    /// Bounded by `max_depth` and a visited set, so it terminates even when
    /// cross-references are malformed into cycles. An unknown starting node
    /// yields an empty result.
    #[must_use]
    pub fn traverse(
        &self,
        start: &NodeId,
        direction: TraversalDirection,
        max_depth: usize,
    ) -> Vec<&RuleNode> {
        let mut visited = Vec::new();
        let mut seen: HashSet<&NodeId> = HashSet::new();
        let mut queue: VecDeque<(&NodeId, usize)> = VecDeque::new();
        queue.push_back((start, 0));

        while let Some((current, depth)) = queue.pop_front() {
            if depth > max_depth || !seen.insert(current) {
                continue;
            }
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            visited.push(node);

            if matches!(direction, TraversalDirection::Down | TraversalDirection::Both) {
                for child in &node.children_ids {
                    queue.push_back((child, depth + 1));
                }
            }
            if matches!(direction, TraversalDirection::Up | TraversalDirection::Both) {
                if let Some(parent) = &node.parent_id {
                    queue.push_back((parent, depth + 1));
                }
            }
        }

        visited
    }

    /// Breadth-first shortest path between two nodes over the union of tree
    /// edges and the `interprets`/`extends` cross-references.
    ///
    /// Returns an empty vec when either node is unknown or no path exists;
    /// never errors.
    #[must_use]
    pub fn reasoning_path(&self, start: &NodeId, end: &NodeId) -> Vec<&RuleNode> {
        if self.get(start).is_none() || self.get(end).is_none() {
            return Vec::new();
        }
        if start == end {
            return self.get(start).map(|n| vec![n]).unwrap_or_default();
        }

        let mut visited: HashSet<&NodeId> = HashSet::new();
        let mut queue: VecDeque<Vec<&NodeId>> = VecDeque::new();
        queue.push_back(vec![start]);

        while let Some(path) = queue.pop_front() {
            let current = *path.last().expect("path is never empty");
            if !visited.insert(current) {
                continue;
            }
            if current == end {
                return path
                    .into_iter()
                    .filter_map(|id| self.nodes.get(id))
                    .collect();
            }
            let Some(node) = self.nodes.get(current) else {
                continue;
            };

            let mut neighbours: Vec<&NodeId> = Vec::new();
            neighbours.extend(node.children_ids.iter());
            if let Some(parent) = &node.parent_id {
                neighbours.push(parent);
            }
            neighbours.extend(node.cross_refs.interprets.iter());
            neighbours.extend(node.cross_refs.extends.iter());

            for next in neighbours {
                if !visited.contains(next) {
                    let mut extended = path.clone();
                    extended.push(next);
                    queue.push_back(extended);
                }
            }
        }

        Vec::new()
    }

    /// Validates a node against this tree's node map.
    ///
    /// Returns the list of violations: missing citation, missing node ID,
    /// all six dimensions empty, dangling parent/child references. Empty for
    /// a well-formed node. Production fixtures must validate clean on every
    /// node; a non-empty list is a fatal load-time condition, not a runtime
    /// one.
    #[must_use]
    pub fn validate_node(&self, node: &RuleNode) -> Vec<String> {
        validate_node_against(node, &self.nodes)
    }
}

fn validate_node_against(
    node: &RuleNode,
    nodes: &HashMap<NodeId, RuleNode>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if node.node_id.is_empty() {
        errors.push("missing node_id".to_string());
    }
    if node.citation.is_empty() {
        errors.push("missing citation".to_string());
    }
    if !node.has_any_dimension() {
        errors.push("at least one dimension must be populated".to_string());
    }
    if let Some(parent) = &node.parent_id {
        if !nodes.contains_key(parent) {
            errors.push(format!("parent node '{parent}' not found"));
        }
    }
    for child in &node.children_ids {
        if !nodes.contains_key(child) {
            errors.push(format!("child node '{child}' not found"));
        }
    }

    errors
}
