//! Gene expression trees stored as an index arena
//!
//! Nodes live in a `Vec` whose order is the tree's flat sibling order: the
//! order used for uniform random selection and for text dumps. The root is
//! always index 0 and can never be removed. Structure is carried by each
//! node's `scale` and `add` child indices, never by position.
//!
//! Invariant: every node in the arena is reachable from the root exactly once.
//! Nothing here can create a cycle: new nodes only enter as fresh leaves and
//! removal detaches whole subtrees.

use std::fmt;
use thiserror::Error;

use crate::core::fixed::Fixed;
use crate::core::types::SenseVector;
use crate::genetics::gene::{GeneNode, NodeIdx};

/// Root position in every tree
pub const ROOT: NodeIdx = 0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeneError {
    #[error("the root node of a gene tree cannot be removed")]
    RootNotRemovable,

    #[error("node {0} is out of range")]
    NodeOutOfRange(NodeIdx),

    #[error("node {parent} already has a {link:?} child")]
    LinkOccupied { parent: NodeIdx, link: Link },

    #[error("node {0} is reachable more than once (cycle or shared child)")]
    Cycle(NodeIdx),

    #[error("{0} nodes are not reachable from the root")]
    Unreachable(usize),
}

/// The two child links a node may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Link {
    Scale,
    Add,
}

/// One chromosome: a non-empty expression tree
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GeneTree {
    nodes: Vec<GeneNode>,
}

impl GeneTree {
    /// Single-node tree
    pub fn new(root: GeneNode) -> Self {
        Self { nodes: vec![root.detached()] }
    }

    /// Linear tree where each node hangs off the previous one on the given link
    pub fn chain(head: GeneNode, rest: impl IntoIterator<Item = (Link, GeneNode)>) -> Self {
        let mut nodes = vec![head.detached()];
        for (link, node) in rest {
            let parent = nodes.len() - 1;
            let idx = nodes.len();
            match link {
                Link::Scale => nodes[parent].scale = Some(idx),
                Link::Add => nodes[parent].add = Some(idx),
            }
            nodes.push(node.detached());
        }
        Self { nodes }
    }

    /// Build from an arena, checking the structural invariant
    pub fn from_nodes(nodes: Vec<GeneNode>) -> Result<Self, GeneError> {
        if nodes.is_empty() {
            return Err(GeneError::NodeOutOfRange(ROOT));
        }
        let tree = Self { nodes };
        tree.validate()?;
        Ok(tree)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True only for a tree with no nodes; the constructors always add a root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[GeneNode] {
        &self.nodes
    }

    pub fn node(&self, idx: NodeIdx) -> Option<&GeneNode> {
        self.nodes.get(idx)
    }

    pub fn node_mut(&mut self, idx: NodeIdx) -> Option<&mut GeneNode> {
        self.nodes.get_mut(idx)
    }

    pub fn child(&self, idx: NodeIdx, link: Link) -> Option<NodeIdx> {
        let node = self.nodes.get(idx)?;
        match link {
            Link::Scale => node.scale,
            Link::Add => node.add,
        }
    }

    fn set_child(&mut self, idx: NodeIdx, link: Link, child: Option<NodeIdx>) {
        if let Some(node) = self.nodes.get_mut(idx) {
            match link {
                Link::Scale => node.scale = child,
                Link::Add => node.add = child,
            }
        }
    }

    /// Value of the whole tree
    pub fn evaluate(&self, senses: &SenseVector) -> Fixed {
        self.evaluate_at(ROOT, senses, 0)
    }

    fn evaluate_at(&self, idx: NodeIdx, senses: &SenseVector, depth: usize) -> Fixed {
        debug_assert!(depth <= self.nodes.len(), "gene tree evaluation exceeded node count");
        let node = &self.nodes[idx];
        let mut value = node.raw_value(senses);
        if let Some(scale) = node.scale {
            value = value.mul(self.evaluate_at(scale, senses, depth + 1));
        }
        if let Some(add) = node.add {
            value += self.evaluate_at(add, senses, depth + 1);
        }
        value
    }

    /// Attach `node` as a fresh leaf under `parent`
    ///
    /// The new node goes to the end of the sibling order.
    pub fn attach(&mut self, parent: NodeIdx, link: Link, node: GeneNode) -> Result<NodeIdx, GeneError> {
        if parent >= self.nodes.len() {
            return Err(GeneError::NodeOutOfRange(parent));
        }
        if self.child(parent, link).is_some() {
            return Err(GeneError::LinkOccupied { parent, link });
        }
        let idx = self.nodes.len();
        self.nodes.push(node.detached());
        self.set_child(parent, link, Some(idx));
        debug_assert!(self.validate().is_ok());
        Ok(idx)
    }

    /// Number of nodes in the subtree rooted at `idx`
    pub fn subtree_size(&self, idx: NodeIdx) -> usize {
        self.subtree(idx).len()
    }

    fn subtree(&self, idx: NodeIdx) -> Vec<NodeIdx> {
        let mut out = Vec::new();
        let mut stack = vec![idx];
        while let Some(i) = stack.pop() {
            let Some(node) = self.nodes.get(i) else { continue };
            out.push(i);
            stack.extend(node.add);
            stack.extend(node.scale);
        }
        out
    }

    fn parent_of(&self, idx: NodeIdx) -> Option<(NodeIdx, Link)> {
        self.nodes.iter().enumerate().find_map(|(i, n)| {
            if n.scale == Some(idx) {
                Some((i, Link::Scale))
            } else if n.add == Some(idx) {
                Some((i, Link::Add))
            } else {
                None
            }
        })
    }

    /// Detach and free the subtree rooted at `idx`
    ///
    /// Returns the number of nodes freed. The root is rejected.
    pub fn remove_subtree(&mut self, idx: NodeIdx) -> Result<usize, GeneError> {
        if idx == ROOT {
            return Err(GeneError::RootNotRemovable);
        }
        if idx >= self.nodes.len() {
            return Err(GeneError::NodeOutOfRange(idx));
        }

        if let Some((parent, link)) = self.parent_of(idx) {
            self.set_child(parent, link, None);
        }

        let mut doomed = vec![false; self.nodes.len()];
        let victims = self.subtree(idx);
        for &i in &victims {
            doomed[i] = true;
        }
        self.compact(&doomed);

        debug_assert!(self.validate().is_ok());
        Ok(victims.len())
    }

    /// Free whatever hangs off one link of `idx`; zero if the link is empty
    pub fn prune_link(&mut self, idx: NodeIdx, link: Link) -> Result<usize, GeneError> {
        match self.child(idx, link) {
            Some(child) => self.remove_subtree(child),
            None => Ok(0),
        }
    }

    /// Drop flagged nodes, keeping sibling order and rewriting links
    fn compact(&mut self, doomed: &[bool]) {
        let mut remap = vec![None; self.nodes.len()];
        let mut next = 0;
        for (i, &gone) in doomed.iter().enumerate() {
            if !gone {
                remap[i] = Some(next);
                next += 1;
            }
        }

        let old = std::mem::take(&mut self.nodes);
        self.nodes = old
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !doomed[*i])
            .map(|(_, mut node)| {
                node.scale = node.scale.and_then(|c| remap[c]);
                node.add = node.add.and_then(|c| remap[c]);
                node
            })
            .collect();
    }

    /// Deep copy rebuilt in pre-order (node, scale subtree, add subtree)
    pub fn duplicate(&self) -> GeneTree {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.copy_into(ROOT, &mut out);
        GeneTree { nodes: out }
    }

    fn copy_into(&self, idx: NodeIdx, out: &mut Vec<GeneNode>) -> NodeIdx {
        let source = &self.nodes[idx];
        let new_idx = out.len();
        out.push(source.detached());
        if let Some(scale) = source.scale {
            let child = self.copy_into(scale, out);
            out[new_idx].scale = Some(child);
        }
        if let Some(add) = source.add {
            let child = self.copy_into(add, out);
            out[new_idx].add = Some(child);
        }
        new_idx
    }

    /// Check that every node is reachable from the root exactly once
    pub fn validate(&self) -> Result<(), GeneError> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![ROOT];
        let mut reached = 0;
        while let Some(i) = stack.pop() {
            let Some(node) = self.nodes.get(i) else {
                return Err(GeneError::NodeOutOfRange(i));
            };
            if seen[i] {
                return Err(GeneError::Cycle(i));
            }
            seen[i] = true;
            reached += 1;
            stack.extend(node.scale);
            stack.extend(node.add);
        }
        if reached < self.nodes.len() {
            return Err(GeneError::Unreachable(self.nodes.len() - reached));
        }
        Ok(())
    }
}

impl fmt::Display for GeneTree {
    /// `[idx,kind,sense,c1,c2,p<idx>,s<idx>]` per node in sibling order
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, n) in self.nodes.iter().enumerate() {
            if i > 0 && i % 4 == 0 {
                writeln!(f)?;
            }
            write!(f, "[{:2},{},{:03},{:6},{:6},", i, n.kind.code(), n.sense_index, n.c1, n.c2)?;
            match n.scale {
                Some(c) => write!(f, "p{:2},", c)?,
                None => write!(f, "p- ,")?,
            }
            match n.add {
                Some(c) => write!(f, "s{:2}]", c)?,
                None => write!(f, "s- ]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::gene::GeneKind;

    fn sample_tree() -> GeneTree {
        // 0: const 2.0, scale -> 1, add -> 2
        // 1: const 0.5, add -> 3
        // 2: const 3.0
        // 3: const 0.25
        let mut tree = GeneTree::new(GeneNode::constant(2048));
        let one = tree.attach(ROOT, Link::Scale, GeneNode::constant(512)).unwrap();
        tree.attach(ROOT, Link::Add, GeneNode::constant(3072)).unwrap();
        tree.attach(one, Link::Add, GeneNode::constant(256)).unwrap();
        tree
    }

    #[test]
    fn test_evaluate_scale_then_add() {
        let tree = sample_tree();
        // 2.0 * (0.5 + 0.25) + 3.0 = 4.5
        assert_eq!(tree.evaluate(&SenseVector::zeroed()), Fixed::from_raw(4608));
    }

    #[test]
    fn test_attach_rejects_occupied_link() {
        let mut tree = sample_tree();
        let err = tree.attach(ROOT, Link::Scale, GeneNode::constant(1)).unwrap_err();
        assert_eq!(err, GeneError::LinkOccupied { parent: ROOT, link: Link::Scale });
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_remove_subtree_counts_and_reindexes() {
        let mut tree = sample_tree();
        let freed = tree.remove_subtree(1).unwrap();
        assert_eq!(freed, 2);
        assert_eq!(tree.len(), 2);
        assert!(tree.validate().is_ok());
        assert_eq!(tree.child(ROOT, Link::Scale), None);
        assert_eq!(tree.child(ROOT, Link::Add), Some(1));
        // 2.0 * 1.0 + 3.0
        assert_eq!(tree.evaluate(&SenseVector::zeroed()), Fixed::from_int(5));
    }

    #[test]
    fn test_root_is_never_removable() {
        let mut single = GeneTree::new(GeneNode::constant(7));
        assert_eq!(single.remove_subtree(ROOT), Err(GeneError::RootNotRemovable));
        assert_eq!(single.prune_link(ROOT, Link::Scale), Ok(0));
        assert_eq!(single.prune_link(ROOT, Link::Add), Ok(0));
        assert_eq!(single.len(), 1);
        assert!(!single.is_empty());
    }

    #[test]
    fn test_prune_link_reports_freed_nodes() {
        let mut tree = sample_tree();
        assert_eq!(tree.prune_link(ROOT, Link::Scale), Ok(2));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.prune_link(ROOT, Link::Scale), Ok(0));
    }

    #[test]
    fn test_prune_link_on_missing_node_frees_nothing() {
        let mut tree = sample_tree();
        assert_eq!(tree.prune_link(9, Link::Add), Ok(0));
        assert_eq!(tree.remove_subtree(9), Err(GeneError::NodeOutOfRange(9)));
    }

    #[test]
    fn test_duplicate_is_preorder_and_equal_in_value() {
        let mut tree = GeneTree::new(GeneNode::constant(1024));
        // Attach add first so the arena order differs from pre-order
        tree.attach(ROOT, Link::Add, GeneNode::constant(100)).unwrap();
        tree.attach(ROOT, Link::Scale, GeneNode::new(GeneKind::Sense, 3, 1024, 0)).unwrap();
        let copy = tree.duplicate();
        assert_eq!(copy.len(), 3);
        assert_eq!(copy.node(1).unwrap().kind, GeneKind::Sense);
        assert_eq!(copy.child(ROOT, Link::Scale), Some(1));
        assert_eq!(copy.child(ROOT, Link::Add), Some(2));

        let mut s = SenseVector::zeroed();
        s.set(3, Fixed::from_raw(777));
        assert_eq!(copy.evaluate(&s), tree.evaluate(&s));
    }

    #[test]
    fn test_validate_detects_cycle_and_orphans() {
        let mut looped = vec![GeneNode::constant(1), GeneNode::constant(2)];
        looped[0].scale = Some(1);
        looped[1].add = Some(0);
        assert!(matches!(GeneTree::from_nodes(looped), Err(GeneError::Cycle(0))));

        let orphan = vec![GeneNode::constant(1), GeneNode::constant(2)];
        assert_eq!(GeneTree::from_nodes(orphan), Err(GeneError::Unreachable(1)));
    }

    #[test]
    fn test_dump_format() {
        let tree = sample_tree();
        let text = tree.to_string();
        assert!(text.starts_with("[ 0,1,000,  2048,     0,p 1,s 2]"));
        assert!(text.contains("[ 3,1,000,   256,     0,p- ,s- ]"));
    }
}
