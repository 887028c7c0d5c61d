use thiserror::Error;

use crate::tag::ValueTag;

/// Errors produced by value classification, coercion, and codec operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    /// The store reported a value tag outside the closed tag set.
    #[error("unknown store value tag: {0:#x}")]
    UnknownTag(u32),

    /// The value's shape cannot be stored under the requested tag.
    #[error("value shape {shape} cannot be stored as {tag}")]
    UnsupportedShape {
        shape: &'static str,
        tag: ValueTag,
    },

    /// The store payload does not decode under its tag.
    #[error("malformed {tag} payload: {reason}")]
    Malformed { tag: ValueTag, reason: String },
}

/// Result alias for value operations.
pub type ValueResult<T> = Result<T, ValueError>;
