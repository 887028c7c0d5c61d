//! Hierarchical, typed key/value trees over a registry-like backing store.
//!
//! hivetree layers a path-addressable tree of [`Container`]s (key nodes)
//! and [`Field`]s (typed leaf values) over any implementation of the
//! [`KeyStore`](hivetree_store::KeyStore) port, with a closed value type
//! system and a recursive export/import engine for whole subtrees.
//!
//! # Architecture
//!
//! - **Containers and fields are value objects.** Constructing or
//!   navigating one performs no I/O; existence is a separately queried,
//!   always-fresh property of the store, not of the object.
//! - **The type system is closed and exact.** Auto-classification maps
//!   native inputs onto seven variants (integers split on the signed
//!   32-bit range, byte sequences to binary, string lists to
//!   multi-strings, `%`-marked strings to expandable paths); explicit tags
//!   coerce or are refused.
//! - **Composite operations are assembled, not atomic.** The store offers
//!   no transactions, so recursive delete, rename, and subtree import
//!   surface their first failing step and leave completed steps in place;
//!   each documents its partial-failure window.
//!
//! # Modules
//!
//! - [`container`] — [`Container`]: navigation, existence, create/delete,
//!   rename, lazy enumeration, field shortcuts
//! - [`field`] — [`Field`]: typed reads and writes, delete, rename
//! - [`snapshot`] — subtree export/import in typed and untyped form
//! - [`registry`] — [`Registry`]: hive resolution to root containers
//! - [`error`] — [`KeyError`] and the `KeyResult` alias
//!
//! # Example
//!
//! ```
//! use hivetree::{Registry, Value};
//! use hivetree_store::InMemoryKeyStore;
//! use hivetree_types::ValueTag;
//!
//! let store = InMemoryKeyStore::new();
//! let app = Registry::resolve(&store, "HKCU")?.container("SOFTWARE\\TestApp");
//!
//! app.set("port", 8080)?;
//! assert_eq!(app.get("port")?, Some(Value::Int32(8080)));
//! assert_eq!(app.field("port").tag()?, Some(ValueTag::Int32));
//!
//! let snapshot = hivetree::snapshot::export_tree_typed(&app)?;
//! app.delete(true)?;
//! hivetree::snapshot::import_tree_typed(
//!     &Registry::resolve(&store, "HKCU")?.container("Restored"),
//!     &snapshot,
//! )?;
//! # Ok::<(), hivetree::KeyError>(())
//! ```

pub mod container;
pub mod error;
pub mod field;
pub mod registry;
pub mod snapshot;

pub use container::{Container, NameIter, SEPARATOR};
pub use error::{KeyError, KeyResult};
pub use field::Field;
pub use registry::Registry;

// Re-export the data model so most callers need only this crate.
pub use hivetree_types::{Hive, Value, ValueTag};
