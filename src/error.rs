//! Error types shared by the facade, the drivers and the serializer.

/// Errors that can occur during cache operations.
///
/// Cache misses and unavailable backends are never errors: the former are
/// reported as `None`, the latter degrade to the file driver. What remains
/// here are genuine faults the caller has to see.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),

    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unknown serializer engine: {0}")]
    UnknownEngine(String),

    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
