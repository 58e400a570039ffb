/// All errors that can be returned by a RecordSource implementation.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The snapshot file could not be read.
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot document is not valid JSON or does not match the wire shape.
    #[error("invalid snapshot document: {0}")]
    Json(#[from] serde_json::Error),

    /// No entity with the given id exists in the source.
    #[error("entity not found: {entity_id}")]
    EntityNotFound { entity_id: String },
}
