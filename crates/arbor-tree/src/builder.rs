//! Level-order tree construction.

use std::collections::VecDeque;

use crate::node::{Node, NodeId, Tree};

/// Child slots assigned to a real node during the breadth-first pass.
#[derive(Debug, Clone, Copy, Default)]
struct Links {
    left: Option<usize>,
    right: Option<usize>,
}

/// Build a tree from a level-order sequence with explicit nulls.
///
/// Slot 0 is the root; an empty sequence or a null root gives the empty tree.
/// Dequeuing a real node consumes up to two following slots as its children
/// (nulls included, which are queued but own nothing). Slots left over once
/// the queue runs dry are ignored. Never fails.
pub fn build_level_order(values: &[Option<i32>]) -> Tree {
    if !matches!(values.first(), Some(Some(_))) {
        return Tree::empty();
    }

    let links = assign_slots(values);
    match assemble(values, &links, 0) {
        Some(root) => Tree::from_root(root),
        None => Tree::empty(),
    }
}

/// Height of the tree `values` would build, without building it.
///
/// Runs in one pass over the slots with no recursion, so it is safe to call
/// on input that has not been validated yet.
pub fn level_order_height(values: &[Option<i32>]) -> u32 {
    if !matches!(values.first(), Some(Some(_))) {
        return 0;
    }

    let links = assign_slots(values);
    let mut depth = vec![0u32; values.len()];
    depth[0] = 1;
    let mut height = 1;

    // Children always sit at higher slots than their parent.
    for slot in 0..values.len() {
        if depth[slot] == 0 {
            continue;
        }
        let Links { left, right } = links[slot];
        for child in [left, right].into_iter().flatten() {
            depth[child] = depth[slot] + 1;
            height = height.max(depth[child]);
        }
    }
    height
}

fn assign_slots(values: &[Option<i32>]) -> Vec<Links> {
    let mut links = vec![Links::default(); values.len()];
    let mut queue = VecDeque::from([0usize]);
    let mut next = 1;

    while next < values.len() {
        let Some(slot) = queue.pop_front() else {
            break;
        };
        if values[slot].is_none() {
            continue;
        }

        if next < values.len() {
            if values[next].is_some() {
                links[slot].left = Some(next);
            }
            queue.push_back(next);
            next += 1;
        }
        if next < values.len() {
            if values[next].is_some() {
                links[slot].right = Some(next);
            }
            queue.push_back(next);
            next += 1;
        }
    }
    links
}

fn assemble(values: &[Option<i32>], links: &[Links], slot: usize) -> Option<Node> {
    let value = values[slot]?;
    let Links { left, right } = links[slot];
    Some(Node::new(
        NodeId(slot),
        value,
        left.and_then(|child| assemble(values, links, child)),
        right.and_then(|child| assemble(values, links, child)),
    ))
}
