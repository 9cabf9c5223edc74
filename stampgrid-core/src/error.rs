use thiserror::Error;

/// Errors originating from the core catalog and viewport types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("invalid viewport: {reason}")]
    InvalidViewport { reason: String },

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// The catalog could not be obtained at all.
///
/// This is the only hard, user-visible failure in the browser; everything
/// else degrades per item.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("catalog source unreachable: {source_name}: {reason}")]
    Unreachable { source_name: String, reason: String },

    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed catalog: {reason}")]
    Malformed { reason: String },
}

/// A single record that cannot be rendered.
///
/// Records failing validation are skipped and logged; they never abort
/// loading of the rest of the catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record {position} ({id}) has no usable year")]
    MissingYear { position: usize, id: String },

    #[error("record {position} is not an object")]
    NotAnObject { position: usize },

    #[error("record {position} has duplicate id {id}")]
    DuplicateId { position: usize, id: String },
}
