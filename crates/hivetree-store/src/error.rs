/// Errors from backing-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The addressed key does not exist.
    #[error("key not found: {path}")]
    KeyNotFound { path: String },

    /// The key still has subkeys; the store refuses to remove it.
    #[error("key not empty: {path}")]
    NotEmpty { path: String },

    /// The handle was never issued by this store or was already closed.
    #[error("invalid key handle")]
    InvalidHandle,

    /// A mutation was attempted through a read-mode handle.
    #[error("handle is open for read only")]
    ReadOnlyHandle,

    /// A lock guarding store state was poisoned by a panicking thread.
    #[error("store lock poisoned")]
    Poisoned,

    /// Any other native backing-store failure, with its code preserved.
    #[error("native store failure during {context} (code {code})")]
    Native { code: i32, context: &'static str },
}

/// Result alias for backing-store operations.
pub type StoreResult<T> = Result<T, StoreError>;
