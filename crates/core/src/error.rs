#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The backing store could not be reached (network, closed feed).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored or received document could not be decoded into a spot.
    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
