//! Simulation of `maxDepth` with one snapshot per meaningful event.
//!
//! Each real node produces seven steps (enter, pre-left, post-left,
//! pre-right, post-right, compare, return) around the recursive calls for
//! its children; each null child produces a single base-case step. With the
//! start and finish steps that gives `8n + 3` steps for `n >= 1` nodes and
//! two steps for the empty tree.

use std::sync::Arc;

use arbor_tree::{Node, NodeId, Tree};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::source::CodeLine;
use crate::step::{
    CallFrame, EdgeKind, EdgeLabel, ReturnInfo, ReturnMap, Side, Step, StepKind, Variable,
    VisitOrder,
};

const PENDING: &str = "pending";

/// The full, immutable step sequence for one tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    steps: Vec<Step>,
    result: u32,
    node_count: usize,
}

impl Trace {
    /// Record the computation for `tree`.
    pub fn record(tree: &Tree) -> Self {
        let trace = Tracer::new(tree).run(tree);
        debug!(
            nodes = trace.node_count,
            steps = trace.steps.len(),
            height = trace.result,
            "recorded trace"
        );
        trace
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Step at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Number of steps; at least 2.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false: every trace has a start and a finish step.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the terminal step.
    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn first(&self) -> Option<&Step> {
        self.steps.first()
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Height computed by the traced program.
    pub fn result(&self) -> u32 {
        self.result
    }

    /// Number of nodes in the traced tree.
    pub fn node_count(&self) -> usize {
        self.node_count
    }
}

/// Step-specific fields; the tracer fills in the shared ones.
struct Draft {
    kind: StepKind,
    description: String,
    line: CodeLine,
    variables: Vec<Variable>,
    current: Option<(i32, NodeId)>,
    depth: u32,
    depth_seen: u32,
    call_stack: Vec<CallFrame>,
    edge_labels: Vec<EdgeLabel>,
}

impl Draft {
    fn new(kind: StepKind, line: CodeLine, description: String) -> Self {
        Self {
            kind,
            description,
            line,
            variables: Vec::new(),
            current: None,
            depth: 0,
            depth_seen: 0,
            call_stack: Vec::new(),
            edge_labels: Vec::new(),
        }
    }

    fn at(mut self, node: &Node, depth: u32) -> Self {
        self.current = Some((node.value(), node.id()));
        self.depth = depth;
        self.depth_seen = depth;
        self
    }

    fn vars(mut self, variables: Vec<Variable>) -> Self {
        self.variables = variables;
        self
    }

    fn stack(mut self, frames: &[CallFrame]) -> Self {
        self.call_stack = frames.to_vec();
        self
    }

    fn edge(mut self, label: Option<EdgeLabel>) -> Self {
        self.edge_labels.extend(label);
        self
    }

    fn seen(mut self, depth: u32) -> Self {
        self.depth_seen = self.depth_seen.max(depth);
        self
    }
}

struct Tracer {
    steps: Vec<Step>,
    /// Pre-order values; the recursion visits nodes in exactly this order.
    order: Arc<[i32]>,
    visited: usize,
    returns: Arc<ReturnMap>,
    high_water: u32,
}

impl Tracer {
    fn new(tree: &Tree) -> Self {
        Self {
            steps: Vec::with_capacity(8 * tree.len() + 3),
            order: tree.preorder().map(Node::value).collect(),
            visited: 0,
            returns: Arc::default(),
            high_water: 0,
        }
    }

    fn run(mut self, tree: &Tree) -> Trace {
        let mut start = Draft::new(
            StepKind::Start,
            CodeLine::Signature,
            "Start maxDepth(root)".to_string(),
        );
        if let Some(root) = tree.root() {
            start.current = Some((root.value(), root.id()));
        }
        self.emit(start);

        let result = match tree.root() {
            None => {
                self.emit(
                    Draft::new(
                        StepKind::Finish,
                        CodeLine::ReturnZero,
                        "Root is null, return depth 0".to_string(),
                    )
                    .vars(vec![Variable::new("return", 0, CodeLine::ReturnZero)]),
                );
                0
            }
            Some(root) => {
                let height = self.visit(Some(root), None, 0, &[]);
                self.emit(
                    Draft::new(
                        StepKind::Finish,
                        CodeLine::ReturnMax,
                        format!("Finished: maximum depth is {height}"),
                    )
                    .vars(vec![Variable::new("result", height, CodeLine::ReturnMax)])
                    .seen(height),
                );
                height
            }
        };

        Trace {
            steps: self.steps,
            result,
            node_count: tree.len(),
        }
    }

    /// Simulate `maxDepth(node)` entered at `level` beneath `parent`.
    fn visit(
        &mut self,
        node: Option<&Node>,
        parent: Option<&Node>,
        level: u32,
        stack: &[CallFrame],
    ) -> u32 {
        let Some(node) = node else {
            let label = parent.map(|p| EdgeLabel {
                from_val: p.value(),
                to_val: None,
                label: "return 0".to_string(),
                kind: EdgeKind::Return,
            });
            let mut draft = Draft::new(
                StepKind::NullBase,
                CodeLine::ReturnZero,
                "Node is null, return depth 0".to_string(),
            )
            .vars(vec![Variable::new("return", 0, CodeLine::ReturnZero)])
            .stack(stack)
            .edge(label);
            draft.depth = level;
            self.emit(draft);
            return 0;
        };

        let value = node.value();
        let depth = level + 1;

        self.visited += 1;
        self.update(value, |_| ReturnInfo::default());

        let mut frames = stack.to_vec();
        frames.push(CallFrame {
            node_value: value,
            depth: level,
        });

        self.emit(
            Draft::new(
                StepKind::Enter,
                CodeLine::NullCheck,
                format!("Visit node {value} at depth {depth}"),
            )
            .at(node, depth)
            .vars(vec![
                Variable::new("node.val", value, CodeLine::NullCheck),
                Variable::new("depth", depth, CodeLine::NullCheck),
            ])
            .stack(&frames),
        );

        // Left subtree
        self.emit(
            Draft::new(
                StepKind::PreLeft,
                CodeLine::LeftCall,
                format!("Recurse into the left subtree of {value}"),
            )
            .at(node, depth)
            .vars(vec![Variable::new("leftDepth", PENDING, CodeLine::LeftCall)])
            .stack(&frames)
            .edge(Some(call_label(node, node.left(), "maxDepth(root.left)"))),
        );

        let left = self.visit(node.left(), Some(node), depth, &frames);
        self.update(value, |info| ReturnInfo {
            left_depth: Some(left),
            ..info
        });

        self.emit(
            Draft::new(
                StepKind::PostLeft,
                CodeLine::LeftCall,
                format!("Left subtree of {value} has depth {left}"),
            )
            .at(node, depth)
            .vars(vec![Variable::new("leftDepth", left, CodeLine::LeftCall)])
            .stack(&frames),
        );

        // Right subtree
        self.emit(
            Draft::new(
                StepKind::PreRight,
                CodeLine::RightCall,
                format!("Recurse into the right subtree of {value}"),
            )
            .at(node, depth)
            .vars(vec![
                Variable::new("leftDepth", left, CodeLine::LeftCall),
                Variable::new("rightDepth", PENDING, CodeLine::RightCall),
            ])
            .stack(&frames)
            .edge(Some(call_label(node, node.right(), "maxDepth(root.right)"))),
        );

        let right = self.visit(node.right(), Some(node), depth, &frames);
        self.update(value, |info| ReturnInfo {
            right_depth: Some(right),
            ..info
        });

        self.emit(
            Draft::new(
                StepKind::PostRight,
                CodeLine::RightCall,
                format!("Right subtree of {value} has depth {right}"),
            )
            .at(node, depth)
            .vars(vec![
                Variable::new("leftDepth", left, CodeLine::LeftCall),
                Variable::new("rightDepth", right, CodeLine::RightCall),
            ])
            .stack(&frames),
        );

        // Compare, ties favour the left subtree
        let winner = if left >= right { Side::Left } else { Side::Right };
        let larger = left.max(right);
        self.update(value, |info| ReturnInfo {
            is_comparing: true,
            ..info
        });

        let verdict = if left == right {
            "equal, left wins the tie".to_string()
        } else {
            format!("{} subtree is deeper", winner.as_str())
        };
        self.emit(
            Draft::new(
                StepKind::Compare { winner },
                CodeLine::ReturnMax,
                format!("Compare leftDepth {left} with rightDepth {right}: {verdict}"),
            )
            .at(node, depth)
            .vars(vec![
                Variable::new("leftDepth", left, CodeLine::LeftCall),
                Variable::new("rightDepth", right, CodeLine::RightCall),
                Variable::new("max", larger, CodeLine::ReturnMax),
            ])
            .stack(&frames),
        );

        // Return
        let result = larger + 1;
        self.update(value, |info| ReturnInfo {
            return_value: Some(result),
            is_comparing: false,
            ..info
        });

        let label = parent.map(|p| EdgeLabel {
            from_val: p.value(),
            to_val: Some(value),
            label: format!("return {result}"),
            kind: EdgeKind::Return,
        });
        self.emit(
            Draft::new(
                StepKind::Return,
                CodeLine::ReturnMax,
                format!("Return max({left}, {right}) + 1 = {result}"),
            )
            .at(node, depth)
            .vars(vec![
                Variable::new("leftDepth", left, CodeLine::LeftCall),
                Variable::new("rightDepth", right, CodeLine::RightCall),
                Variable::new("return", result, CodeLine::ReturnMax),
            ])
            .stack(&frames)
            .edge(label)
            .seen(result),
        );

        result
    }

    /// Rewrite one entry of the live map. Snapshots already holding the
    /// previous `Arc` keep their copy.
    fn update(&mut self, value: i32, f: impl FnOnce(ReturnInfo) -> ReturnInfo) {
        let map = Arc::make_mut(&mut self.returns);
        let current = map.get(&value).copied().unwrap_or_default();
        map.insert(value, f(current));
    }

    fn emit(&mut self, draft: Draft) {
        self.high_water = self.high_water.max(draft.depth_seen);
        let (current_node, current_node_id) = match draft.current {
            Some((value, id)) => (Some(value), Some(id)),
            None => (None, None),
        };

        self.steps.push(Step {
            step_number: self.steps.len(),
            kind: draft.kind,
            description: draft.description,
            highlight_line: draft.line,
            variables: draft.variables,
            current_node,
            current_node_id,
            current_depth: draft.depth,
            max_depth_so_far: self.high_water,
            call_stack: draft.call_stack,
            visited_nodes: VisitOrder::prefix(Arc::clone(&self.order), self.visited),
            node_returns: Arc::clone(&self.returns),
            edge_labels: draft.edge_labels,
        });
    }
}

fn call_label(parent: &Node, child: Option<&Node>, label: &str) -> EdgeLabel {
    EdgeLabel {
        from_val: parent.value(),
        to_val: child.map(Node::value),
        label: label.to_string(),
        kind: EdgeKind::Call,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_tree::build_level_order;
    use proptest::prelude::*;

    fn trace_of(values: &[Option<i32>]) -> Trace {
        Trace::record(&build_level_order(values))
    }

    fn kinds(trace: &Trace) -> Vec<StepKind> {
        trace.steps().iter().map(|s| s.kind).collect()
    }

    #[test]
    fn empty_tree_has_two_steps() {
        let trace = trace_of(&[]);
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.result(), 0);
        assert_eq!(kinds(&trace), vec![StepKind::Start, StepKind::Finish]);

        let last = trace.last().unwrap();
        assert_eq!(last.highlight_line, CodeLine::ReturnZero);
        assert_eq!(last.variable("return").unwrap().value, "0");
        assert!(last.call_stack.is_empty());
    }

    #[test]
    fn single_node_sequence() {
        let trace = trace_of(&[Some(1)]);
        assert_eq!(trace.result(), 1);
        assert_eq!(trace.len(), 11);
        assert_eq!(
            kinds(&trace),
            vec![
                StepKind::Start,
                StepKind::Enter,
                StepKind::PreLeft,
                StepKind::NullBase,
                StepKind::PostLeft,
                StepKind::PreRight,
                StepKind::NullBase,
                StepKind::PostRight,
                StepKind::Compare { winner: Side::Left },
                StepKind::Return,
                StepKind::Finish,
            ]
        );
    }

    #[test]
    fn known_heights() {
        assert_eq!(trace_of(&[Some(1)]).result(), 1);
        assert_eq!(
            trace_of(&[Some(3), Some(9), Some(20), None, None, Some(15), Some(7)]).result(),
            3
        );
        assert_eq!(trace_of(&[Some(1), None, Some(2)]).result(), 2);
        assert_eq!(
            trace_of(&[Some(1), Some(2), None, Some(3), None, Some(4)]).result(),
            4
        );
    }

    #[test]
    fn start_step_has_empty_stack() {
        let trace = trace_of(&[Some(3), Some(9), Some(20)]);
        let start = trace.first().unwrap();
        assert_eq!(start.step_number, 0);
        assert_eq!(start.kind, StepKind::Start);
        assert_eq!(start.highlight_line, CodeLine::Signature);
        assert!(start.call_stack.is_empty());
        assert!(start.visited_nodes.is_empty());
        assert_eq!(start.current_node, Some(3));
    }

    #[test]
    fn step_numbers_are_indices() {
        let trace = trace_of(&[Some(3), Some(9), Some(20), None, None, Some(15), Some(7)]);
        for (i, step) in trace.steps().iter().enumerate() {
            assert_eq!(step.step_number, i);
        }
    }

    #[test]
    fn ties_favour_left() {
        let trace = trace_of(&[Some(1), Some(2), Some(3)]);
        let root_compare = trace
            .steps()
            .iter()
            .rev()
            .find(|s| matches!(s.kind, StepKind::Compare { .. }))
            .unwrap();
        assert_eq!(root_compare.current_node, Some(1));
        assert_eq!(root_compare.kind, StepKind::Compare { winner: Side::Left });
    }

    #[test]
    fn deeper_right_subtree_wins() {
        let trace = trace_of(&[Some(1), None, Some(2)]);
        let root_compare = trace
            .steps()
            .iter()
            .rev()
            .find(|s| matches!(s.kind, StepKind::Compare { .. }))
            .unwrap();
        assert_eq!(root_compare.kind, StepKind::Compare { winner: Side::Right });
        assert_eq!(root_compare.variable("max").unwrap().value, "1");
    }

    #[test]
    fn call_stack_extends_per_invocation() {
        let trace = trace_of(&[Some(1), Some(2), None, Some(3)]);
        let deepest = trace
            .steps()
            .iter()
            .find(|s| s.kind == StepKind::Enter && s.current_node == Some(3))
            .unwrap();
        assert_eq!(
            deepest.call_stack,
            vec![
                CallFrame {
                    node_value: 1,
                    depth: 0
                },
                CallFrame {
                    node_value: 2,
                    depth: 1
                },
                CallFrame {
                    node_value: 3,
                    depth: 2
                },
            ]
        );
        assert_eq!(deepest.current_depth, 3);

        // Back in the root after both children returned.
        let root_return = trace
            .steps()
            .iter()
            .find(|s| s.kind == StepKind::Return && s.current_node == Some(1))
            .unwrap();
        assert_eq!(root_return.call_stack.len(), 1);
    }

    #[test]
    fn null_child_inherits_parent_stack_and_labels_edge() {
        let trace = trace_of(&[Some(7)]);
        let null_step = &trace.steps()[3];
        assert_eq!(null_step.kind, StepKind::NullBase);
        assert_eq!(null_step.current_node, None);
        assert_eq!(null_step.current_depth, 1);
        assert_eq!(null_step.call_stack.len(), 1);
        assert_eq!(
            null_step.edge_labels,
            vec![EdgeLabel {
                from_val: 7,
                to_val: None,
                label: "return 0".to_string(),
                kind: EdgeKind::Return,
            }]
        );
    }

    #[test]
    fn call_and_return_edge_labels() {
        let trace = trace_of(&[Some(1), Some(2)]);
        let pre_left = trace
            .steps()
            .iter()
            .find(|s| s.kind == StepKind::PreLeft && s.current_node == Some(1))
            .unwrap();
        assert_eq!(pre_left.edge_labels[0].kind, EdgeKind::Call);
        assert_eq!(pre_left.edge_labels[0].to_val, Some(2));

        let child_return = trace
            .steps()
            .iter()
            .find(|s| s.kind == StepKind::Return && s.current_node == Some(2))
            .unwrap();
        assert_eq!(
            child_return.edge_labels,
            vec![EdgeLabel {
                from_val: 1,
                to_val: Some(2),
                label: "return 1".to_string(),
                kind: EdgeKind::Return,
            }]
        );

        // The root has no parent to report to.
        let root_return = trace
            .steps()
            .iter()
            .find(|s| s.kind == StepKind::Return && s.current_node == Some(1))
            .unwrap();
        assert!(root_return.edge_labels.is_empty());
    }

    #[test]
    fn return_info_progresses_without_rewriting_history() {
        let trace = trace_of(&[Some(1), Some(2)]);
        let steps = trace.steps();
        let find = move |kind: StepKind| {
            steps
                .iter()
                .find(|s| s.kind == kind && s.current_node == Some(1))
                .unwrap()
        };

        let enter = find(StepKind::Enter);
        assert_eq!(enter.return_info(1), Some(&ReturnInfo::default()));

        let post_left = find(StepKind::PostLeft);
        assert_eq!(post_left.return_info(1).unwrap().left_depth, Some(1));
        assert_eq!(post_left.return_info(1).unwrap().right_depth, None);

        let compare = find(StepKind::Compare { winner: Side::Left });
        assert!(compare.return_info(1).unwrap().is_comparing);
        assert_eq!(compare.return_info(1).unwrap().return_value, None);

        let ret = find(StepKind::Return);
        let info = ret.return_info(1).unwrap();
        assert!(!info.is_comparing);
        assert_eq!(info.return_value, Some(2));
        assert_eq!((info.left_depth, info.right_depth), (Some(1), Some(0)));

        // Earlier snapshots still hold their own copy.
        assert_eq!(enter.return_info(1), Some(&ReturnInfo::default()));
        assert!(enter.return_info(2).is_none());
    }

    #[test]
    fn is_comparing_only_on_compare_steps() {
        let trace = trace_of(&[Some(3), Some(9), Some(20), None, None, Some(15), Some(7)]);
        for step in trace.steps() {
            let comparing = step.node_returns.values().filter(|i| i.is_comparing).count();
            let expected = usize::from(matches!(step.kind, StepKind::Compare { .. }));
            assert_eq!(comparing, expected, "step {}", step.step_number);
        }
    }

    #[test]
    fn finish_step_reports_result() {
        let trace = trace_of(&[Some(3), Some(9), Some(20), None, None, Some(15), Some(7)]);
        let last = trace.last().unwrap();
        assert_eq!(last.kind, StepKind::Finish);
        assert_eq!(last.current_node, None);
        assert!(last.call_stack.is_empty());
        assert_eq!(last.max_depth_so_far, 3);
        assert_eq!(last.visited_nodes, vec![3, 9, 20, 15, 7]);
        assert_eq!(last.variable("result").unwrap().value, "3");
    }

    #[test]
    fn visit_lists_grow_one_node_at_a_time() {
        let trace = trace_of(&[Some(3), Some(9), Some(20), None, None, Some(15), Some(7)]);
        let mut previous: Vec<i32> = Vec::new();
        for step in trace.steps() {
            let current = step.visited_nodes.to_vec();
            assert!(current.starts_with(&previous));
            assert!(current.len() <= previous.len() + 1);
            previous = current;
        }
    }

    #[test]
    fn chain_at_height_cap() {
        let height = arbor_tree::MAX_TREE_HEIGHT;
        let mut values = vec![Some(0)];
        for i in 1..height as i32 {
            values.push(Some(i));
            values.push(None);
        }

        let trace = trace_of(&values);
        assert_eq!(trace.result(), height);
        assert_eq!(trace.len(), 8 * height as usize + 3);

        let deepest = trace.steps().iter().map(|s| s.call_stack.len()).max().unwrap();
        assert_eq!(deepest, height as usize);
    }

    #[test]
    fn duplicate_values_share_return_entry() {
        let trace = trace_of(&[Some(5), Some(5)]);
        let last = trace.last().unwrap();
        assert_eq!(last.visited_nodes, vec![5, 5]);
        assert_eq!(last.node_returns.len(), 1);
        assert_eq!(last.return_info(5).unwrap().return_value, Some(2));
    }

    #[test]
    fn current_node_id_tracks_identity() {
        let trace = trace_of(&[Some(5), Some(5)]);
        let ids: Vec<_> = trace
            .steps()
            .iter()
            .filter(|s| s.kind == StepKind::Enter)
            .map(|s| s.current_node_id)
            .collect();
        assert_eq!(ids, vec![Some(NodeId(0)), Some(NodeId(1))]);
    }

    fn level_order() -> impl Strategy<Value = Vec<Option<i32>>> {
        proptest::collection::vec(proptest::option::weighted(0.8, -100i32..=100), 0..48)
    }

    proptest! {
        #[test]
        fn max_depth_so_far_never_decreases(values in level_order()) {
            let trace = trace_of(&values);
            for pair in trace.steps().windows(2) {
                prop_assert!(pair[0].max_depth_so_far <= pair[1].max_depth_so_far);
            }
        }

        #[test]
        fn terminal_step_visits_every_node(values in level_order()) {
            let tree = build_level_order(&values);
            let trace = Trace::record(&tree);
            prop_assert_eq!(trace.last().unwrap().visited_nodes.len(), tree.len());
            prop_assert_eq!(trace.node_count(), tree.len());
        }

        #[test]
        fn recording_is_deterministic(values in level_order()) {
            let tree = build_level_order(&values);
            prop_assert_eq!(Trace::record(&tree), Trace::record(&tree));
        }

        #[test]
        fn length_depends_only_on_shape(values in level_order()) {
            let tree = build_level_order(&values);
            let trace = Trace::record(&tree);
            let expected = if tree.is_empty() { 2 } else { 8 * tree.len() + 3 };
            prop_assert_eq!(trace.len(), expected);
        }

        #[test]
        fn result_matches_tree_height(values in level_order()) {
            let tree = build_level_order(&values);
            let trace = Trace::record(&tree);
            prop_assert_eq!(trace.result(), tree.height());
            prop_assert_eq!(trace.last().unwrap().max_depth_so_far, tree.height());
        }
    }
}
