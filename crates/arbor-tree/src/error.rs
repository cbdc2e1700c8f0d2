//! Error types for arbor-tree.

use thiserror::Error;

/// Result type for arbor-tree operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors produced while parsing a textual level-order sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Nothing but whitespace was supplied.
    #[error("input is empty")]
    Empty,

    /// A token is neither `null` nor an integer.
    #[error("invalid value: {token:?}")]
    InvalidToken { token: String },

    /// An integer falls outside the accepted range. `value` is the token as
    /// written, which may not fit any machine integer.
    #[error("value {value} out of range [{min}, {max}]")]
    OutOfRange { value: String, min: i32, max: i32 },

    /// The sequence holds more slots than allowed.
    #[error("too many values: {len} (max {max})")]
    TooLong { len: usize, max: usize },

    /// The tree the sequence describes is taller than allowed.
    #[error("tree too deep: height {height} (max {max})")]
    TooDeep { height: u32, max: u32 },
}
