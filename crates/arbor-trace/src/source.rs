//! The traced program and the lines a step can highlight.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Listing of the recursive height computation shown next to the tree.
pub const ALGORITHM_SOURCE: &str = "\
public int maxDepth(TreeNode root) {
    if (root == null) {
        return 0;
    }
    int leftDepth = maxDepth(root.left);
    int rightDepth = maxDepth(root.right);
    return Math.max(leftDepth, rightDepth) + 1;
}";

/// Iterate the listing line by line (line 1 first).
pub fn source_lines() -> impl Iterator<Item = &'static str> {
    ALGORITHM_SOURCE.lines()
}

/// A line of [`ALGORITHM_SOURCE`] that steps highlight. Serialized as its
/// 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
#[repr(u32)]
pub enum CodeLine {
    /// `public int maxDepth(TreeNode root) {`
    Signature = 1,
    /// `if (root == null) {`
    NullCheck = 2,
    /// `return 0;`
    ReturnZero = 3,
    /// `int leftDepth = maxDepth(root.left);`
    LeftCall = 5,
    /// `int rightDepth = maxDepth(root.right);`
    RightCall = 6,
    /// `return Math.max(leftDepth, rightDepth) + 1;`
    ReturnMax = 7,
}

impl CodeLine {
    /// 1-based line number.
    pub const fn number(self) -> u32 {
        self as u32
    }

    /// Source text of this line.
    pub fn text(self) -> &'static str {
        source_lines()
            .nth(self.number() as usize - 1)
            .unwrap_or_default()
    }
}

/// A line number that no step ever highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("line {0} is not a traced line")]
pub struct UnknownLine(pub u32);

impl From<CodeLine> for u32 {
    fn from(line: CodeLine) -> Self {
        line.number()
    }
}

impl TryFrom<u32> for CodeLine {
    type Error = UnknownLine;

    fn try_from(number: u32) -> Result<Self, Self::Error> {
        match number {
            1 => Ok(CodeLine::Signature),
            2 => Ok(CodeLine::NullCheck),
            3 => Ok(CodeLine::ReturnZero),
            5 => Ok(CodeLine::LeftCall),
            6 => Ok(CodeLine::RightCall),
            7 => Ok(CodeLine::ReturnMax),
            other => Err(UnknownLine(other)),
        }
    }
}
