//! Execution snapshots recorded by the trace engine.

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

use arbor_tree::NodeId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::source::CodeLine;

/// Which subtree a comparison selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// The event a step records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StepKind {
    /// Before the first call
    Start,
    /// A node's invocation begins
    Enter,
    /// About to recurse into the left child
    PreLeft,
    /// Left child's depth is known
    PostLeft,
    /// About to recurse into the right child
    PreRight,
    /// Right child's depth is known
    PostRight,
    /// Both depths compared; ties go left
    Compare { winner: Side },
    /// A node's invocation returns its depth
    Return,
    /// A null child returns 0
    NullBase,
    /// The outermost call has returned
    Finish,
}

/// A variable shown next to a line of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: String,
    pub line: CodeLine,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl ToString, line: CodeLine) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
            line,
        }
    }
}

/// One active invocation on the simulated call stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFrame {
    pub node_value: i32,
    /// Zero-based level the invocation was entered at.
    pub depth: u32,
}

/// Partial results of a node's invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnInfo {
    pub left_depth: Option<u32>,
    pub right_depth: Option<u32>,
    pub return_value: Option<u32>,
    pub is_comparing: bool,
}

/// Per-node partial results, keyed by node value.
pub type ReturnMap = BTreeMap<i32, ReturnInfo>;

/// Direction of an edge annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Call,
    Return,
}

/// Annotation drawn on the edge between a parent and a child (or a null slot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeLabel {
    pub from_val: i32,
    pub to_val: Option<i32>,
    pub label: String,
    pub kind: EdgeKind,
}

/// Node values visited so far, in visit order.
///
/// Visits only ever append, so every step holds a prefix of one shared
/// visit order. Serializes as a plain list.
#[derive(Debug, Clone)]
pub struct VisitOrder {
    order: Arc<[i32]>,
    len: usize,
}

impl VisitOrder {
    /// The first `len` entries of `order`.
    pub fn prefix(order: Arc<[i32]>, len: usize) -> Self {
        let len = len.min(order.len());
        Self { order, len }
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.order[..self.len]
    }
}

impl Default for VisitOrder {
    fn default() -> Self {
        Self::prefix(Arc::from(Vec::new()), 0)
    }
}

impl Deref for VisitOrder {
    type Target = [i32];

    fn deref(&self) -> &[i32] {
        self.as_slice()
    }
}

impl PartialEq for VisitOrder {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for VisitOrder {}

impl PartialEq<Vec<i32>> for VisitOrder {
    fn eq(&self, other: &Vec<i32>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Serialize for VisitOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.as_slice())
    }
}

impl<'de> Deserialize<'de> for VisitOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<i32>::deserialize(deserializer)?;
        let len = values.len();
        Ok(Self::prefix(Arc::from(values), len))
    }
}

/// A point-in-time snapshot of the simulated computation.
///
/// Snapshots never share mutable state: the call stack is an owned copy,
/// the visit list is an immutable prefix, and `node_returns` is a
/// copy-on-write map that is only ever mutated through a fresh clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub step_number: usize,
    pub kind: StepKind,
    pub description: String,
    pub highlight_line: CodeLine,
    pub variables: Vec<Variable>,
    pub current_node: Option<i32>,
    pub current_node_id: Option<NodeId>,
    pub current_depth: u32,
    pub max_depth_so_far: u32,
    pub call_stack: Vec<CallFrame>,
    pub visited_nodes: VisitOrder,
    pub node_returns: Arc<ReturnMap>,
    pub edge_labels: Vec<EdgeLabel>,
}

impl Step {
    /// Variable by name, if active at this step.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Return bookkeeping for a node value.
    pub fn return_info(&self, value: i32) -> Option<&ReturnInfo> {
        self.node_returns.get(&value)
    }

    /// Whether a node value has been visited by this step.
    pub fn is_visited(&self, value: i32) -> bool {
        self.visited_nodes.contains(&value)
    }
}
