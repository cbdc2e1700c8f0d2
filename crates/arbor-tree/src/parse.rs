//! Textual level-order sequences: `[3,9,20,null,null,15,7]`.

use std::num::IntErrorKind;

use crate::builder::level_order_height;
use crate::error::{ParseError, Result};
use crate::{MAX_SEQUENCE_LEN, MAX_TREE_HEIGHT, VALUE_MAX, VALUE_MIN};

/// Bounds enforced while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseLimits {
    pub min_value: i32,
    pub max_value: i32,
    pub max_len: usize,
    pub max_height: u32,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            min_value: VALUE_MIN,
            max_value: VALUE_MAX,
            max_len: MAX_SEQUENCE_LEN,
            max_height: MAX_TREE_HEIGHT,
        }
    }
}

/// Parse a comma separated level-order sequence.
///
/// One pair of surrounding brackets is optional. Tokens are trimmed; `null`
/// and empty tokens are absent slots, anything else must be a base-10
/// integer within `limits`. The tree the sequence builds must also be no
/// taller than `limits.max_height`.
pub fn parse_level_order(input: &str, limits: ParseLimits) -> Result<Vec<Option<i32>>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed)
        .trim();
    if inner.is_empty() {
        return Ok(Vec::new());
    }

    let tokens: Vec<&str> = inner.split(',').map(str::trim).collect();
    if tokens.len() > limits.max_len {
        return Err(ParseError::TooLong {
            len: tokens.len(),
            max: limits.max_len,
        });
    }

    let values = tokens
        .into_iter()
        .map(|token| parse_token(token, &limits))
        .collect::<Result<Vec<_>>>()?;

    let height = level_order_height(&values);
    if height > limits.max_height {
        return Err(ParseError::TooDeep {
            height,
            max: limits.max_height,
        });
    }
    Ok(values)
}

fn parse_token(token: &str, limits: &ParseLimits) -> Result<Option<i32>> {
    if token.is_empty() || token == "null" {
        return Ok(None);
    }

    let out_of_range = || ParseError::OutOfRange {
        value: token.to_string(),
        min: limits.min_value,
        max: limits.max_value,
    };

    let value: i64 = token.parse().map_err(|e: std::num::ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => out_of_range(),
        _ => ParseError::InvalidToken {
            token: token.to_string(),
        },
    })?;

    if value < i64::from(limits.min_value) || value > i64::from(limits.max_value) {
        return Err(out_of_range());
    }

    // In range of two i32 bounds, so the narrowing is lossless.
    Ok(Some(value as i32))
}

/// Render a sequence back to its bracketed textual form.
pub fn format_level_order(values: &[Option<i32>]) -> String {
    let body: Vec<String> = values
        .iter()
        .map(|value| match value {
            Some(v) => v.to_string(),
            None => "null".to_string(),
        })
        .collect();
    format!("[{}]", body.join(","))
}
