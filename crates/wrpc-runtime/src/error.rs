use wrpc_codec::CodecError;
use wrpc_transport::{BoxError, TransportError};

use crate::server::StopHandle;

/// Errors that can occur while serving or invoking a function.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    /// Decoding parameter `index` failed. Later parameters were not read.
    #[error("failed to read parameter {index}: {source}")]
    Parameter {
        index: u32,
        #[source]
        source: CodecError,
    },

    /// The handler for `function` (`instance.name`) returned an error.
    #[error("failed to handle `{function}` invocation: {source}")]
    Handler {
        function: String,
        #[source]
        source: BoxError,
    },

    /// Encoding result value `index` failed.
    #[error("failed to write result value {index}: {source}")]
    Result {
        index: u32,
        #[source]
        source: CodecError,
    },

    /// Writing the inline result body failed.
    #[error("failed to write result: {0}")]
    Transmit(#[source] std::io::Error),

    /// Deriving the sub-stream for result `index` failed.
    #[error("failed to index writer with {index}: {source}")]
    Index {
        index: u32,
        #[source]
        source: TransportError,
    },

    /// A deferred result write on sub-stream `index` failed.
    #[error("failed to write result value {index} to its sub-stream: {source}")]
    Deferred {
        index: u32,
        #[source]
        source: CodecError,
    },

    /// Encoding parameter `index` on the client side failed.
    #[error("failed to write parameter {index}: {source}")]
    ParameterEncode {
        index: u32,
        #[source]
        source: CodecError,
    },

    /// Parameter `index` needs a sub-stream, which client invocation does
    /// not carry.
    #[error("parameter {0} cannot be sent inline")]
    DeferredParameter(u32),

    /// Decoding result value `index` on the client side failed.
    #[error("failed to read result value {index}: {source}")]
    ResultDecode {
        index: u32,
        #[source]
        source: CodecError,
    },

    /// The invocation context was cancelled.
    #[error("invocation cancelled")]
    Cancelled,

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, InvokeError>;

/// Registering one function of an interface failed.
///
/// `registered` holds the stops for the functions registered before the
/// failure, so the caller can unwind them.
#[derive(Debug, thiserror::Error)]
#[error("failed to serve `{function}`: {source}")]
pub struct ServeError {
    pub function: String,
    #[source]
    pub source: TransportError,
    pub registered: StopHandle,
}
