//! Binary tree nodes with value-independent identity.

/// Identity of a node: its slot in the level-order input sequence.
///
/// Values may repeat within a tree; ids never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub usize);

impl NodeId {
    /// Id of the root slot.
    pub const ROOT: Self = Self(0);

    /// Create from a raw slot index.
    #[inline]
    pub const fn new(slot: usize) -> Self {
        Self(slot)
    }

    /// Get the raw slot index.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

/// A binary tree node. Children are owned exclusively by their parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    value: i32,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    /// Create a node with the given children.
    pub fn new(id: NodeId, value: i32, left: Option<Node>, right: Option<Node>) -> Self {
        Self {
            id,
            value,
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }

    /// Create a node without children.
    pub fn leaf(id: NodeId, value: i32) -> Self {
        Self::new(id, value, None, None)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn left(&self) -> Option<&Node> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Node> {
        self.right.as_deref()
    }

    /// Whether this node has neither child.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Number of nodes in the subtree rooted here.
    pub fn count(&self) -> usize {
        Preorder::from_node(Some(self)).count()
    }

    /// Height of the subtree rooted here (a leaf has height 1).
    pub fn height(&self) -> u32 {
        let left = self.left().map_or(0, Node::height);
        let right = self.right().map_or(0, Node::height);
        left.max(right) + 1
    }
}

/// An optional root together with its node count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    root: Option<Node>,
    len: usize,
}

impl Tree {
    /// The empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap an already assembled root.
    pub fn from_root(root: Node) -> Self {
        let len = root.count();
        Self {
            root: Some(root),
            len,
        }
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree; 0 for the empty tree.
    pub fn height(&self) -> u32 {
        self.root.as_ref().map_or(0, Node::height)
    }

    /// Iterate nodes root first, left subtree before right.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder::from_node(self.root.as_ref())
    }

    /// Find a node by id.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.preorder().find(|node| node.id() == id)
    }
}

/// Pre-order iterator over a tree, driven by an explicit stack.
pub struct Preorder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Preorder<'a> {
    fn from_node(node: Option<&'a Node>) -> Self {
        Self {
            stack: node.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(right) = node.right() {
            self.stack.push(right);
        }
        if let Some(left) = node.left() {
            self.stack.push(left);
        }
        Some(node)
    }
}
