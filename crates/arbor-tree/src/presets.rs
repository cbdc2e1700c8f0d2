//! Sample inputs offered to users.

/// A named level-order input with its known height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Preset {
    pub name: &'static str,
    pub input: &'static str,
    pub expected_height: u32,
}

/// Built-in presets, in display order.
pub const PRESETS: &[Preset] = &[
    Preset {
        name: "Example 1",
        input: "[3,9,20,null,null,15,7]",
        expected_height: 3,
    },
    Preset {
        name: "Example 2",
        input: "[1,null,2]",
        expected_height: 2,
    },
    Preset {
        name: "Empty tree",
        input: "[]",
        expected_height: 0,
    },
    Preset {
        name: "Single node",
        input: "[1]",
        expected_height: 1,
    },
    Preset {
        name: "Complete tree",
        input: "[1,2,3,4,5,6,7]",
        expected_height: 3,
    },
    Preset {
        name: "Left skewed",
        input: "[1,2,null,3,null,4]",
        expected_height: 4,
    },
];
