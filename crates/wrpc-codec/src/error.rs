use wrpc_transport::TransportError;

/// Errors that can occur while encoding or decoding values.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The stream ended cleanly before the first byte of a value.
    #[error("end of stream")]
    Eof,

    /// The stream ended in the middle of a value.
    #[error("unexpected end of stream")]
    UnexpectedEnd,

    /// A discriminant does not fit the enum's bit width.
    #[error("discriminant overflows an {bits}-bit integer")]
    DiscriminantOverflow { bits: u32 },

    /// An integer does not fit its declared bit width.
    #[error("varint overflows a {bits}-bit integer")]
    IntegerOverflow { bits: u32 },

    /// A discriminant names no declared variant.
    #[error("unknown discriminant value {0}")]
    UnknownDiscriminant(u8),

    /// A length does not fit the 32-bit wire field.
    #[error("byte length of {len} overflows a 32-bit integer")]
    LengthOverflow { len: usize },

    /// A decoded length exceeds the configured limit.
    #[error("length {len} exceeds configured max {max}")]
    LengthLimit { len: usize, max: usize },

    /// A boolean byte other than 0 or 1.
    #[error("invalid bool value {0:#04x}")]
    InvalidBool(u8),

    /// String bytes are not valid UTF-8.
    #[error("string bytes are not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// An I/O error, with the step that produced it.
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        source: std::io::Error,
    },

    /// Deriving an indexed sub-stream failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl CodecError {
    /// Wrap an I/O error with the step that produced it.
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
