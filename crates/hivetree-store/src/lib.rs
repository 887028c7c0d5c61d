//! The backing store port for hivetree.
//!
//! This crate defines the minimal operation set hivetree requires from its
//! environment's hierarchical attribute store, and the backends that
//! implement it:
//!
//! - [`KeyStore`] — the port trait: scoped open/create/close, indexed
//!   subkey and value enumeration, named value read/write/remove, and key
//!   removal
//! - [`ScopedKey`] — RAII guard binding every primitive operation to one
//!   acquired handle, released on every exit path
//! - [`InMemoryKeyStore`] — `RwLock`-protected per-hive trees for tests and
//!   embedding, with the native store's case-insensitive, case-preserving
//!   name semantics
//! - `WindowsKeyStore` (`cfg(windows)`) — the native Win32 registry adapter
//!
//! # Design Rules
//!
//! 1. Every call reflects the store's state at call time — handles pin
//!    nothing and there is no caching layer.
//! 2. Absence a caller can act on is data (`Ok(None)` / `Ok(false)`), not
//!    an error.
//! 3. No operation spans more than one lock acquisition on the backend;
//!    multi-step consistency is explicitly not provided here.
//! 4. The store never interprets value payloads — it moves `(tag, bytes)`
//!    records verbatim.

pub mod error;
pub mod handle;
pub mod memory;
pub mod traits;
#[cfg(windows)]
pub mod windows;

pub use error::{StoreError, StoreResult};
pub use handle::{KeyHandle, ScopedKey};
pub use memory::InMemoryKeyStore;
pub use traits::{Access, KeyStore, RawValue};
#[cfg(windows)]
pub use windows::WindowsKeyStore;
