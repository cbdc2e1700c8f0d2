//! Deterministic 2D placement of tree nodes.
//!
//! Each node takes the midpoint of its horizontal interval and hands the two
//! halves to its children, so nodes at the same depth never collide. Rows
//! sit `height / LEVEL_DIVISIONS` apart below a fixed top margin. A final
//! pass shifts every x by one constant so the occupied span is centered,
//! which keeps lopsided trees in view.

use std::collections::HashMap;

use crate::node::{Node, NodeId, Tree};

/// Number of rows the viewport height is divided into.
pub const LEVEL_DIVISIONS: f64 = 5.0;

/// Vertical offset of the root row.
pub const TOP_MARGIN: f64 = 40.0;

/// Size of the drawing area.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Vertical distance between consecutive depths.
    pub fn level_height(&self) -> f64 {
        self.height / LEVEL_DIVISIONS
    }
}

/// Where a single node is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodePosition {
    pub node: NodeId,
    pub value: i32,
    pub x: f64,
    pub y: f64,
    pub depth: u32,
}

/// A parent to child connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub parent: NodeId,
    pub child: NodeId,
}

/// Positions for every node of a tree, keyed by node identity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Layout {
    viewport: Viewport,
    positions: Vec<NodePosition>,
    edges: Vec<Edge>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: HashMap<NodeId, usize>,
}

impl Layout {
    /// Lay out `tree` inside `viewport`.
    pub fn compute(tree: &Tree, viewport: Viewport) -> Self {
        let mut layout = Self {
            viewport,
            positions: Vec::with_capacity(tree.len()),
            edges: Vec::with_capacity(tree.len().saturating_sub(1)),
            index: HashMap::with_capacity(tree.len()),
        };

        if let Some(root) = tree.root() {
            layout.place(root, 0, 0.0, viewport.width);
            layout.center();
        }

        layout.index = layout
            .positions
            .iter()
            .enumerate()
            .map(|(i, pos)| (pos.node, i))
            .collect();
        layout
    }

    fn place(&mut self, node: &Node, depth: u32, left: f64, right: f64) {
        let x = (left + right) / 2.0;
        self.positions.push(NodePosition {
            node: node.id(),
            value: node.value(),
            x,
            y: f64::from(depth) * self.viewport.level_height() + TOP_MARGIN,
            depth,
        });

        if let Some(child) = node.left() {
            self.edges.push(Edge {
                parent: node.id(),
                child: child.id(),
            });
            self.place(child, depth + 1, left, x);
        }
        if let Some(child) = node.right() {
            self.edges.push(Edge {
                parent: node.id(),
                child: child.id(),
            });
            self.place(child, depth + 1, x, right);
        }
    }

    fn center(&mut self) {
        let Some((min_x, max_x)) = self.bounds() else {
            return;
        };
        let shift = self.viewport.width / 2.0 - (min_x + max_x) / 2.0;
        for pos in &mut self.positions {
            pos.x += shift;
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// All positions, root first, in pre-order.
    pub fn positions(&self) -> &[NodePosition] {
        &self.positions
    }

    /// Parent to child connectors, in pre-order of the child.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Position of a node by id.
    pub fn get(&self, id: NodeId) -> Option<&NodePosition> {
        self.index.get(&id).map(|&i| &self.positions[i])
    }

    /// Both endpoints of a connector.
    pub fn endpoints(&self, edge: &Edge) -> Option<(&NodePosition, &NodePosition)> {
        Some((self.get(edge.parent)?, self.get(edge.child)?))
    }

    /// Horizontal extent `(min_x, max_x)` of the occupied positions.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let first = self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first.x, first.x), |(lo, hi), pos| (lo.min(pos.x), hi.max(pos.x))),
        )
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
