use std::fmt;
use std::io;

use wrpc_codec::CodecError;
use wrpc_runtime::{InvokeError, ServeError};
use wrpc_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::BrokenPipe | io::ErrorKind::UnexpectedEof => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Io(source) => io_error(context, source),
        TransportError::Invocation(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn codec_error(context: &str, err: CodecError) -> CliError {
    match err {
        CodecError::Io { source, .. } => io_error(context, source),
        CodecError::Transport(err) => transport_error(context, err),
        CodecError::LengthOverflow { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn invoke_error(context: &str, err: InvokeError) -> CliError {
    match err {
        InvokeError::Transport(err) => transport_error(context, err),
        InvokeError::Transmit(source) => io_error(context, source),
        InvokeError::Parameter { .. } | InvokeError::ResultDecode { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        InvokeError::Handler { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn serve_error(context: &str, err: ServeError) -> CliError {
    let message = format!("{context}: {err}");
    if let Err(stop_err) = err.registered.stop() {
        return CliError::new(
            TRANSPORT_ERROR,
            format!("{message} (cleanup failed: {stop_err})"),
        );
    }
    CliError::new(TRANSPORT_ERROR, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failures_are_data_invalid() {
        let err = codec_error("decode failed", CodecError::UnknownDiscriminant(9));
        assert_eq!(err.code, DATA_INVALID);
        assert_eq!(err.message, "decode failed: unknown discriminant value 9");
    }

    #[test]
    fn missing_function_is_transport_error() {
        let err = invoke_error(
            "invoke failed",
            InvokeError::Transport(TransportError::NotServing {
                instance: "a:b/c".into(),
                name: "d".into(),
            }),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn handler_failure_is_plain_failure() {
        let err = invoke_error(
            "invoke failed",
            InvokeError::Handler {
                function: "a:b/c.d".into(),
                source: "nope".into(),
            },
        );
        assert_eq!(err.code, FAILURE);
        assert!(err.message.ends_with("failed to handle `a:b/c.d` invocation: nope"));
    }
}
