//! Random level-order sequences for quick experiments.

use rand::Rng;

use crate::{VALUE_MAX, VALUE_MIN};

/// Upper bound on the number of nodes a random tree may hold.
pub const MAX_RANDOM_NODES: usize = 15;

/// Chance that an open child slot receives a node.
pub const RANDOM_NODE_PROBABILITY: f64 = 0.7;

/// Generate a random level-order sequence with at most `node_count` nodes.
///
/// The root is always present. Open child slots are filled breadth-first,
/// each with a node of uniform value in `[VALUE_MIN, VALUE_MAX]` or a null,
/// until the node budget is spent or no open slot remains. Trailing nulls
/// are trimmed, so every slot in the result is consumed by the builder.
pub fn random_level_order<R: Rng + ?Sized>(rng: &mut R, node_count: usize) -> Vec<Option<i32>> {
    if node_count == 0 {
        return Vec::new();
    }

    let budget = node_count.min(MAX_RANDOM_NODES);
    let mut values = vec![Some(rng.gen_range(VALUE_MIN..=VALUE_MAX))];
    let mut placed = 1;
    let mut open_slots = 2;

    while placed < budget && open_slots > 0 {
        open_slots -= 1;
        if rng.gen_bool(RANDOM_NODE_PROBABILITY) {
            values.push(Some(rng.gen_range(VALUE_MIN..=VALUE_MAX)));
            placed += 1;
            open_slots += 2;
        } else {
            values.push(None);
        }
    }

    while matches!(values.last(), Some(None)) {
        values.pop();
    }
    values
}
