/// Boxed error returned by invocation handlers across the transport boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No handler is registered for the function.
    #[error("`{instance}.{name}` is not being served")]
    NotServing { instance: String, name: String },

    /// A handler is already registered for the function.
    #[error("`{instance}.{name}` is already being served")]
    AlreadyServing { instance: String, name: String },

    /// The stream has no sub-stream at this index.
    #[error("no sub-stream at index {0}")]
    InvalidIndex(u32),

    /// The handler serving an invocation failed.
    #[error("invocation failed: {0}")]
    Invocation(#[source] BoxError),

    /// The transport has been shut down.
    #[error("transport shut down")]
    Shutdown,
}

pub type Result<T> = std::result::Result<T, TransportError>;
