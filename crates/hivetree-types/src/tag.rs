//! Store-native value type tags and their portable names.
//!
//! Every [`Value`](crate::Value) variant maps 1:1 to a [`ValueTag`]; the tag
//! is what the backing store records next to the raw payload. The numeric
//! values are the store's own (`REG_SZ` = 1, `REG_DWORD` = 4, ...); the
//! portable names (`STRING`, `INTEGER`, ...) are what the export contract
//! writes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-native classification of a field value.
///
/// The set is closed. [`ValueTag::raw`] / [`ValueTag::from_raw`] convert to
/// and from the store's numeric tag space; [`fmt::Display`] and serde use
/// the portable names of the export contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueTag {
    /// Explicit absence of type (`REG_NONE`). Distinct from "field not present".
    #[serde(rename = "NONE")]
    None,
    /// Plain string (`REG_SZ`).
    #[serde(rename = "STRING")]
    String,
    /// String holding environment-style placeholders (`REG_EXPAND_SZ`).
    #[serde(rename = "PATH")]
    ExpandablePath,
    /// Raw byte sequence (`REG_BINARY`).
    #[serde(rename = "BINARY")]
    Binary,
    /// 32-bit integer (`REG_DWORD`).
    #[serde(rename = "INTEGER")]
    Int32,
    /// Ordered sequence of strings (`REG_MULTI_SZ`).
    #[serde(rename = "STRINGS")]
    MultiString,
    /// 64-bit integer (`REG_QWORD`).
    #[serde(rename = "LONG_INT")]
    Int64,
}

impl ValueTag {
    /// Every tag, in native numeric order.
    pub const ALL: [ValueTag; 7] = [
        ValueTag::None,
        ValueTag::String,
        ValueTag::ExpandablePath,
        ValueTag::Binary,
        ValueTag::Int32,
        ValueTag::MultiString,
        ValueTag::Int64,
    ];

    /// The store's numeric tag for this variant.
    pub fn raw(&self) -> u32 {
        match self {
            ValueTag::None => 0,
            ValueTag::String => 1,
            ValueTag::ExpandablePath => 2,
            ValueTag::Binary => 3,
            ValueTag::Int32 => 4,
            ValueTag::MultiString => 7,
            ValueTag::Int64 => 11,
        }
    }

    /// Resolve a numeric tag. Returns `None` outside the closed set.
    pub fn from_raw(raw: u32) -> Option<ValueTag> {
        match raw {
            0 => Some(ValueTag::None),
            1 => Some(ValueTag::String),
            2 => Some(ValueTag::ExpandablePath),
            3 => Some(ValueTag::Binary),
            4 => Some(ValueTag::Int32),
            7 => Some(ValueTag::MultiString),
            11 => Some(ValueTag::Int64),
            _ => None,
        }
    }

    /// The portable name used by the export contract.
    pub fn name(&self) -> &'static str {
        match self {
            ValueTag::None => "NONE",
            ValueTag::String => "STRING",
            ValueTag::ExpandablePath => "PATH",
            ValueTag::Binary => "BINARY",
            ValueTag::Int32 => "INTEGER",
            ValueTag::MultiString => "STRINGS",
            ValueTag::Int64 => "LONG_INT",
        }
    }

    /// Resolve a portable name (exact match). Returns `None` otherwise.
    pub fn from_name(name: &str) -> Option<ValueTag> {
        ValueTag::ALL.iter().copied().find(|tag| tag.name() == name)
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
