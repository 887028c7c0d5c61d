//! The closed typed-value union and its shape classification.
//!
//! A [`Value`] is what a field holds. The variant set mirrors the backing
//! store's closed tag set exactly (see [`ValueTag`]); classification of
//! native Rust inputs happens in the `From` conversions and in
//! [`Value::canonicalized`], which applies the rules in a fixed priority
//! order:
//!
//! 1. integers split by the signed 32-bit range into [`Value::Int32`] /
//!    [`Value::Int64`];
//! 2. raw bytes are [`Value::Binary`];
//! 3. sequences of strings are [`Value::MultiString`];
//! 4. strings containing the `%` placeholder marker are
//!    [`Value::ExpandablePath`], all other strings are [`Value::String`].
//!
//! The rules are exact and not configurable. Explicit-tag writes bypass
//! classification and go through [`Value::coerced_to`] instead, which
//! either reshapes the value (numeric widen/narrow, string reflagging,
//! number stringification) or rejects it with
//! [`ValueError::UnsupportedShape`].

use serde::{Deserialize, Serialize};

use crate::error::{ValueError, ValueResult};
use crate::tag::ValueTag;

/// The placeholder marker that flags a string as environment-expandable.
pub const EXPAND_MARKER: char = '%';

/// A typed field value.
///
/// Serde note: the representation is untagged, so the JSON projection is
/// the natural one (`null`, numbers, strings, arrays). Deserialization
/// resolves strings to [`Value::String`] and re-classification happens on
/// write; the typed export tree carries the [`ValueTag`] alongside when the
/// distinction must survive serialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit absence of type. Distinct from "field not present".
    None,
    /// Integer within the signed 32-bit range.
    Int32(i32),
    /// Integer outside the signed 32-bit range (or explicitly 64-bit).
    Int64(i64),
    /// Plain string.
    String(String),
    /// String containing environment-style placeholders; semantically a
    /// string, flagged for later expansion by consumers (never by hivetree).
    ExpandablePath(String),
    /// Ordered sequence of strings.
    MultiString(Vec<String>),
    /// Raw byte sequence.
    Binary(Vec<u8>),
}

impl Value {
    /// The store-native tag for this variant (total, 1:1).
    pub fn tag(&self) -> ValueTag {
        match self {
            Value::None => ValueTag::None,
            Value::Int32(_) => ValueTag::Int32,
            Value::Int64(_) => ValueTag::Int64,
            Value::String(_) => ValueTag::String,
            Value::ExpandablePath(_) => ValueTag::ExpandablePath,
            Value::MultiString(_) => ValueTag::MultiString,
            Value::Binary(_) => ValueTag::Binary,
        }
    }

    /// Re-apply the shape classification rules.
    ///
    /// Integers move to the narrowest fitting width class and strings are
    /// re-flagged by the `%` marker. Idempotent; applied on every
    /// auto-typed write so manually constructed variants behave exactly
    /// like converted native inputs.
    pub fn canonicalized(self) -> Value {
        match self {
            Value::Int64(n) => Value::from(n),
            Value::String(s) | Value::ExpandablePath(s) => Value::from_string(s),
            other => other,
        }
    }

    /// Reshape this value for a write under an explicit tag.
    ///
    /// Identity when the tag already matches. Allowed conversions:
    /// integer widen/narrow (range-checked), string ⇄ expandable-path
    /// reflagging, integer → string stringification, and empty-list ⇄
    /// empty-binary crossover (the empty shapes are indistinguishable).
    /// Everything else fails with [`ValueError::UnsupportedShape`].
    pub fn coerced_to(self, tag: ValueTag) -> ValueResult<Value> {
        if self.tag() == tag {
            return Ok(self);
        }
        match (self, tag) {
            (Value::Int32(n), ValueTag::Int64) => Ok(Value::Int64(n as i64)),
            (Value::Int64(n), ValueTag::Int32) => match i32::try_from(n) {
                Ok(n) => Ok(Value::Int32(n)),
                Err(_) => Err(ValueError::UnsupportedShape {
                    shape: "64-bit integer",
                    tag,
                }),
            },
            (Value::Int32(n), ValueTag::String) => Ok(Value::String(n.to_string())),
            (Value::Int64(n), ValueTag::String) => Ok(Value::String(n.to_string())),
            (Value::String(s), ValueTag::ExpandablePath) => Ok(Value::ExpandablePath(s)),
            (Value::ExpandablePath(s), ValueTag::String) => Ok(Value::String(s)),
            (Value::MultiString(v), ValueTag::Binary) if v.is_empty() => {
                Ok(Value::Binary(Vec::new()))
            }
            (Value::Binary(b), ValueTag::MultiString) if b.is_empty() => {
                Ok(Value::MultiString(Vec::new()))
            }
            (value, tag) => Err(ValueError::UnsupportedShape {
                shape: value.shape_name(),
                tag,
            }),
        }
    }

    /// Human-readable shape name, for diagnostics.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Int32(_) => "32-bit integer",
            Value::Int64(_) => "64-bit integer",
            Value::String(_) => "string",
            Value::ExpandablePath(_) => "expandable path",
            Value::MultiString(_) => "multi-string",
            Value::Binary(_) => "binary",
        }
    }

    /// String content, for both string-shaped variants.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::ExpandablePath(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, widened, for both integer variants.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(n) => Some(*n as i64),
            Value::Int64(n) => Some(*n),
            _ => None,
        }
    }

    /// The string sequence of a [`Value::MultiString`].
    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            Value::MultiString(v) => Some(v),
            _ => None,
        }
    }

    /// The byte content of a [`Value::Binary`].
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Returns `true` for the explicit [`Value::None`] marker.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    fn from_string(s: String) -> Value {
        if s.contains(EXPAND_MARKER) {
            Value::ExpandablePath(s)
        } else {
            Value::String(s)
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int32(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::from(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        match i32::try_from(n) {
            Ok(n) => Value::Int32(n),
            Err(_) => Value::Int64(n),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::from_string(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::from_string(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::MultiString(v)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::MultiString(v.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Value {
    fn from(v: [&str; N]) -> Self {
        Value::MultiString(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Binary(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Binary(b.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(b: &[u8; N]) -> Self {
        Value::Binary(b.to_vec())
    }
}
