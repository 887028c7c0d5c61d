use hivetree_types::Hive;

use crate::error::StoreResult;
use crate::handle::KeyHandle;

/// Access mode requested when opening a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Read and enumerate only.
    Read,
    /// Read plus value writes and removals.
    Write,
}

/// A store-native value record: the raw numeric tag and the raw payload.
///
/// The store never interprets the payload; decoding it into a typed value
/// is `hivetree-types`' concern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawValue {
    /// The store's numeric type tag.
    pub tag: u32,
    /// The raw payload bytes.
    pub data: Vec<u8>,
}

/// The minimal operation set hivetree requires from its backing store.
///
/// All implementations must satisfy these invariants:
/// - Keys are addressed by `(hive, path)` with `\`-separated segments; the
///   empty path addresses the hive root. Name comparison is
///   case-insensitive and stored names keep their original case.
/// - Every operation reflects the store's state at call time. No caching:
///   a handle does not pin the key it was opened on, and a handle to a key
///   removed behind it reports [`StoreError::KeyNotFound`].
/// - Indexed enumeration signals end-of-range with `Ok(None)`, never an
///   error. The order is stable between calls absent concurrent mutation.
/// - Absence is data, not failure, wherever a caller can act on it:
///   reads return `Ok(None)`, removals return `Ok(false)`.
/// - Handles must be released with [`KeyStore::close`]; the
///   [`ScopedKey`](crate::ScopedKey) guard does so on every exit path.
pub trait KeyStore: Send + Sync {
    /// Open an existing key in the requested access mode.
    ///
    /// Returns [`StoreError::KeyNotFound`] if the key does not exist.
    fn open(&self, hive: Hive, path: &str, access: Access) -> StoreResult<KeyHandle>;

    /// Create a key, materializing every missing ancestor, and open it for
    /// write. Idempotent over already-existing keys.
    fn create(&self, hive: Hive, path: &str) -> StoreResult<KeyHandle>;

    /// Release a handle. Every issued handle must be closed exactly once.
    fn close(&self, handle: KeyHandle) -> StoreResult<()>;

    /// The name of the `index`-th subkey, or `Ok(None)` past the end.
    fn subkey_name(&self, handle: KeyHandle, index: usize) -> StoreResult<Option<String>>;

    /// The name and record of the `index`-th value, or `Ok(None)` past the
    /// end.
    fn value_entry(&self, handle: KeyHandle, index: usize)
        -> StoreResult<Option<(String, RawValue)>>;

    /// Read a named value. Returns `Ok(None)` if the value is absent.
    fn read_value(&self, handle: KeyHandle, name: &str) -> StoreResult<Option<RawValue>>;

    /// Write a named value, creating or replacing it.
    ///
    /// Requires a write-mode handle ([`StoreError::ReadOnlyHandle`]).
    fn write_value(&self, handle: KeyHandle, name: &str, value: &RawValue) -> StoreResult<()>;

    /// Remove a named value. Returns `Ok(false)` if it was absent.
    ///
    /// Requires a write-mode handle.
    fn remove_value(&self, handle: KeyHandle, name: &str) -> StoreResult<bool>;

    /// Remove a key. Returns `Ok(false)` if it was absent.
    ///
    /// The key's own values are removed with it, but a key that still has
    /// subkeys is refused with [`StoreError::NotEmpty`] — recursion is the
    /// caller's job. Hive roots cannot be removed; an empty path returns
    /// `Ok(false)`.
    fn remove_key(&self, hive: Hive, path: &str) -> StoreResult<bool>;
}
