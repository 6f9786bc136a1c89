use crate::error::TreeError;
use crate::token::Kind;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Node identity, assigned from 1 in creation order by the owning tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Synthetic wrapper, only present for two or more statements.
    StmtSequence,
    If,
    Repeat,
    Assign(String),
    Read(String),
    Write,
    Op(Kind),
    Const(u64),
    Id(String),
    /// Stands in for a factor or statement that could not be parsed.
    Error,
}

impl NodeKind {
    pub fn label(&self) -> String {
        match self {
            NodeKind::StmtSequence => "stmt_sequence".to_string(),
            NodeKind::If => "if".to_string(),
            NodeKind::Repeat => "repeat".to_string(),
            NodeKind::Assign(name) => format!("assign({})", name),
            NodeKind::Read(name) => format!("read({})", name),
            NodeKind::Write => "write".to_string(),
            NodeKind::Op(op) => format!("op({})", op.lexeme()),
            NodeKind::Const(value) => format!("const({})", value),
            NodeKind::Id(name) => format!("id({})", name),
            NodeKind::Error => "error".to_string(),
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            NodeKind::StmtSequence => Shape::Hidden,
            NodeKind::If
            | NodeKind::Repeat
            | NodeKind::Assign(_)
            | NodeKind::Read(_)
            | NodeKind::Write => Shape::Box,
            NodeKind::Op(_) | NodeKind::Const(_) | NodeKind::Id(_) | NodeKind::Error => {
                Shape::Ellipse
            }
        }
    }
}

/// Presentation hint for renderers. Statements are drawn as boxes,
/// expressions as ellipses, and sequence wrappers are not drawn at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Box,
    Ellipse,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn label(&self) -> String {
        self.kind.label()
    }

    pub fn shape(&self) -> Shape {
        self.kind.shape()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_sequence_wrapper(&self) -> bool {
        self.kind == NodeKind::StmtSequence
    }
}

/// Arena of nodes keyed by [`NodeId`], with a single root.
///
/// Children keep insertion order. Every node has at most one parent, so the
/// nodes reachable from the root always form a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseTree {
    root: Option<NodeId>,
    nodes: BTreeMap<NodeId, Node>,
    next_id: u32,
}

impl ParseTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached node with the next id.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(
            id,
            Node {
                id,
                kind,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    /// Creates a node and appends it as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, TreeError> {
        if !self.nodes.contains_key(&parent) {
            return Err(TreeError::UnknownNode(parent));
        }
        let id = self.add_node(kind);
        self.link(parent, id);
        Ok(id)
    }

    /// Appends the detached node `child` as the last child of `parent`.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if !self.nodes.contains_key(&parent) {
            return Err(TreeError::UnknownNode(parent));
        }
        match self.nodes.get(&child) {
            None => return Err(TreeError::UnknownNode(child)),
            Some(node) if node.parent.is_some() => return Err(TreeError::AlreadyAttached(child)),
            Some(_) => {}
        }
        if self.root == Some(child) {
            return Err(TreeError::IsRoot(child));
        }

        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(TreeError::Cycle { parent, child });
            }
            cursor = self.nodes.get(&id).and_then(|node| node.parent);
        }

        self.link(parent, child);
        Ok(())
    }

    /// Unchecked [`ParseTree::attach`]; both nodes must exist and `child`
    /// must be a detached subtree root.
    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    /// Unchecked [`ParseTree::set_root`]; `id` must be a detached node.
    pub(crate) fn link_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn set_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        match self.nodes.get(&id) {
            None => Err(TreeError::UnknownNode(id)),
            Some(node) if node.parent.is_some() => Err(TreeError::AlreadyAttached(id)),
            Some(_) => {
                self.root = Some(id);
                Ok(())
            }
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn label(&self, id: NodeId) -> Option<String> {
        self.nodes.get(&id).map(Node::label)
    }

    /// Ordered children of `id`; empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(Node::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(Node::parent)
    }

    pub fn is_sequence_wrapper(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(Node::is_sequence_wrapper)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in id order, reachable from the root or not.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Pre-order walk starting at `id` (included).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        if !self.contains(id) {
            return order;
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        order
    }

    /// Copies `id` and everything reachable from it into a new tree rooted
    /// at `id`. Node ids are preserved.
    pub fn subtree(&self, id: NodeId) -> Option<ParseTree> {
        if !self.contains(id) {
            return None;
        }

        let mut nodes = BTreeMap::new();
        for node_id in self.descendants(id) {
            if let Some(node) = self.nodes.get(&node_id) {
                nodes.insert(node_id, node.clone());
            }
        }
        if let Some(root) = nodes.get_mut(&id) {
            root.parent = None;
        }
        let next_id = nodes.keys().next_back().map_or(0, |last| last.0);

        Some(ParseTree {
            root: Some(id),
            nodes,
            next_id,
        })
    }

    /// Moves every node of `other` into this tree and hangs its root under
    /// `parent`. Returns the id of the merged root.
    pub fn merge(&mut self, parent: NodeId, other: ParseTree) -> Result<NodeId, TreeError> {
        let other_root = other.root.ok_or(TreeError::EmptyTree)?;
        if !self.contains(parent) {
            return Err(TreeError::UnknownNode(parent));
        }
        if let Some(clash) = other.nodes.keys().find(|id| self.contains(**id)) {
            return Err(TreeError::DuplicateNode(*clash));
        }

        self.next_id = self.next_id.max(other.next_id);
        self.nodes.extend(other.nodes);
        self.link(parent, other_root);
        Ok(other_root)
    }

    fn write_outline(&self, f: &mut fmt::Formatter, root: NodeId) -> fmt::Result {
        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let label = self.label(id).unwrap_or_default();
            writeln!(f, "{:indent$}{}", "", label, indent = depth * 2)?;
            stack.extend(self.children(id).iter().rev().map(|child| (*child, depth + 1)));
        }
        Ok(())
    }

    /// Builds the JSON view bottom-up, so deep trees need no recursion here.
    fn view(&self, root: NodeId) -> Option<NodeView> {
        let mut built: BTreeMap<NodeId, NodeView> = BTreeMap::new();
        for id in self.descendants(root).into_iter().rev() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            let children = node
                .children
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(
                id,
                NodeView {
                    id,
                    label: node.label(),
                    shape: node.shape(),
                    sequence: node.is_sequence_wrapper(),
                    children,
                },
            );
        }
        built.remove(&root)
    }
}

/// Indented outline of the nodes reachable from the root, two spaces per
/// level.
impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.root {
            Some(root) => self.write_outline(f, root),
            None => Ok(()),
        }
    }
}

#[derive(Serialize)]
struct NodeView {
    id: NodeId,
    label: String,
    shape: Shape,
    sequence: bool,
    children: Vec<NodeView>,
}

/// Serializes as nested `{id, label, shape, sequence, children}` objects
/// starting at the root, or `null` for an empty tree.
impl Serialize for ParseTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.and_then(|root| self.view(root)).serialize(serializer)
    }
}
