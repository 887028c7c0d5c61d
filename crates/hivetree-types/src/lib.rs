//! Foundation types for hivetree.
//!
//! This crate defines the data model shared by every hivetree crate:
//!
//! - [`Hive`] — the closed set of backing-store root namespaces and their
//!   symbolic alias table
//! - [`ValueTag`] — the store-native type tags and their portable names
//! - [`Value`] — the typed value union, with shape classification in its
//!   `From` conversions and explicit-tag coercion in [`Value::coerced_to`]
//! - [`codec`] — the exact codec between a [`Value`] and the store-native
//!   `(tag, bytes)` record
//! - [`tree`] — the portable export trees ([`PlainTree`], [`TypedTree`])
//!   whose JSON projection is the external export contract
//!
//! No I/O happens here; everything that touches the backing store lives in
//! `hivetree-store` and `hivetree`.

pub mod codec;
pub mod error;
pub mod hive;
pub mod tag;
pub mod tree;
pub mod value;

pub use error::{ValueError, ValueResult};
pub use hive::Hive;
pub use tag::ValueTag;
pub use tree::{PlainNode, PlainTree, TypedNode, TypedTree};
pub use value::{Value, EXPAND_MARKER};
