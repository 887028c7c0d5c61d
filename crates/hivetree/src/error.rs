use hivetree_store::StoreError;
use hivetree_types::ValueError;

/// Errors from container, field, and subtree operations.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// The addressed container does not exist and no default applies.
    #[error("container not found: {path}")]
    NotFound { path: String },

    /// The addressed field does not exist and no default applies.
    #[error("field not found: {path}\\{name}")]
    FieldNotFound { path: String, name: String },

    /// A non-recursive delete was blocked by remaining contents.
    #[error(
        "container not empty: {path} ({subkeys} subcontainer(s), {fields} field(s)); \
         use a recursive delete"
    )]
    NotEmpty {
        path: String,
        subkeys: usize,
        fields: usize,
    },

    /// The symbolic hive alias is outside the closed table.
    #[error("unknown hive alias: {0:?}")]
    UnknownHive(String),

    /// The native hive handle is outside the closed set.
    #[error("unknown hive handle: {0:#x}")]
    UnknownHiveHandle(u32),

    /// The operation does not apply to a hive root.
    #[error("cannot {op} a hive root")]
    RootUnsupported { op: &'static str },

    /// A value failed classification, coercion, or decoding.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// Any other backing-store failure, with the cause preserved.
    #[error("backing store failure: {0}")]
    Store(#[from] StoreError),
}

/// Result alias for tree operations.
pub type KeyResult<T> = Result<T, KeyError>;

/// Lift a store-level "key not found" into the tree-level taxonomy; every
/// other store failure stays wrapped.
pub(crate) fn key_error(err: StoreError) -> KeyError {
    match err {
        StoreError::KeyNotFound { path } => KeyError::NotFound { path },
        other => KeyError::Store(other),
    }
}
