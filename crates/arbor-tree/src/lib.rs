//! Arbor Tree Model
//!
//! Binary trees as the height visualizer sees them: built once from a
//! level-order sequence, read-only afterwards, and laid out on a 2D canvas.
//!
//! # Ownership
//!
//! Every parent exclusively owns its children (`Option<Box<Node>>`), so a
//! [`Tree`] is always finite and acyclic. Node identity is carried by
//! [`NodeId`], the node's slot in the level-order input, which keeps nodes
//! with equal values distinguishable.
//!
//! # Level Order
//!
//! `[3, 9, 20, null, null, 15, 7]` is read breadth-first: slot 0 is the root,
//! every real node consumes the next two slots as its children, and a null
//! consumes nothing.
//!
//! # Layout
//!
//! [`Layout::compute`] halves the horizontal interval at every level and then
//! recenters the occupied bounding box, giving stable coordinates for any
//! viewport.

mod builder;
mod error;
mod layout;
mod node;
mod parse;
mod presets;
mod random;

pub use builder::{build_level_order, level_order_height};
pub use error::{ParseError, Result};
pub use layout::{Edge, Layout, NodePosition, Viewport, LEVEL_DIVISIONS, TOP_MARGIN};
pub use node::{Node, NodeId, Preorder, Tree};
pub use parse::{format_level_order, parse_level_order, ParseLimits};
pub use presets::{Preset, PRESETS};
pub use random::{random_level_order, MAX_RANDOM_NODES, RANDOM_NODE_PROBABILITY};

/// Smallest node value accepted by default.
pub const VALUE_MIN: i32 = -100;

/// Largest node value accepted by default.
pub const VALUE_MAX: i32 = 100;

/// Default cap on the length of a level-order sequence.
pub const MAX_SEQUENCE_LEN: usize = 10_000;

/// Default cap on the height of a parsed tree.
///
/// Building, tracing and laying out a tree all recurse once per level, and
/// every trace step copies the call stack, so height bounds both stack depth
/// and trace size.
pub const MAX_TREE_HEIGHT: u32 = 64;
