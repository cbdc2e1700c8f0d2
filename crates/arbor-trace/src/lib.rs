//! Arbor Execution Trace
//!
//! Records every meaningful state transition of the recursive tree height
//! computation so it can be replayed step by step.
//!
//! # Model
//!
//! - **Trace**: the ordered, immutable sequence of [`Step`]s for one tree
//! - **Step**: a snapshot of the simulated program (highlighted line,
//!   variables, call stack, visited nodes, partial return values)
//! - **Source**: the fixed listing the steps point into
//!
//! # Determinism
//!
//! Recording is a pure function of tree shape and values: the same tree
//! always yields a deep-equal trace.
//!
//! # Usage
//!
//! ```
//! use arbor_tree::build_level_order;
//! use arbor_trace::Trace;
//!
//! let tree = build_level_order(&[Some(3), Some(9), Some(20), None, None, Some(15), Some(7)]);
//! let trace = Trace::record(&tree);
//! assert_eq!(trace.result(), 3);
//! ```

mod engine;
mod source;
mod step;

pub use engine::Trace;
pub use source::{source_lines, CodeLine, UnknownLine, ALGORITHM_SOURCE};
pub use step::{
    CallFrame, EdgeKind, EdgeLabel, ReturnInfo, ReturnMap, Side, Step, StepKind, Variable,
    VisitOrder,
};
