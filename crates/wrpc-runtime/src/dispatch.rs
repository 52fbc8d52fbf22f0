//! Function dispatch: decode parameters, call the handler, send results.

use std::io::{Read, Write};
use std::sync::Arc;

use tracing::{debug, trace, warn};
use wrpc_codec::{CodecConfig, CodecError, Decode, Encode, ResultSet};
use wrpc_transport::{BoxError, Context, HandlerFn, IndexRead, IndexWrite, Serve, Stop};

use crate::error::{InvokeError, Result};
use crate::transmit::transmit;

/// What a user handler returns: its results, or an opaque failure.
pub type HandlerResult<T> = std::result::Result<T, BoxError>;

/// A function's parameter list, decoded in declared order.
pub trait DecodeParams: Sized {
    fn decode_params<R: Read + ?Sized>(r: &mut R, config: &CodecConfig) -> Result<Self>;
}

/// A function's result tuple, encoded in declared order.
pub trait EncodeResults {
    fn encode_results(self, results: &mut ResultSet) -> Result<()>;
}

fn decode_param<T: Decode, R: Read + ?Sized>(
    r: &mut R,
    index: u32,
    config: &CodecConfig,
) -> Result<T> {
    trace!(index, "reading parameter");
    T::decode(r, config).map_err(|source| {
        // A missing parameter is truncation, not a clean end.
        let source = match source {
            CodecError::Eof => CodecError::UnexpectedEnd,
            other => other,
        };
        InvokeError::Parameter { index, source }
    })
}

fn encode_result<T: Encode>(value: T, results: &mut ResultSet) -> Result<()> {
    let index = results.len();
    results
        .push(value)
        .map_err(|source| InvokeError::Result { index, source })
}

impl DecodeParams for () {
    fn decode_params<R: Read + ?Sized>(_r: &mut R, _config: &CodecConfig) -> Result<Self> {
        Ok(())
    }
}

impl EncodeResults for () {
    fn encode_results(self, _results: &mut ResultSet) -> Result<()> {
        Ok(())
    }
}

macro_rules! impl_tuples {
    ($(($($idx:tt $ty:ident),+))*) => {
        $(
            impl<$($ty: Decode),+> DecodeParams for ($($ty,)+) {
                fn decode_params<R: Read + ?Sized>(r: &mut R, config: &CodecConfig) -> Result<Self> {
                    Ok(($(decode_param::<$ty, R>(r, $idx, config)?,)+))
                }
            }

            impl<$($ty: Encode),+> EncodeResults for ($($ty,)+) {
                fn encode_results(self, results: &mut ResultSet) -> Result<()> {
                    $(encode_result(self.$idx, results)?;)+
                    Ok(())
                }
            }
        )*
    };
}

impl_tuples! {
    (0 A)
    (0 A, 1 B)
    (0 A, 1 B, 2 C)
    (0 A, 1 B, 2 C, 3 D)
}

/// Serve one invocation of `function` on the given stream pair.
///
/// Parameters are decoded before `f` runs; a decode failure means `f` is not
/// called. If `f` fails nothing is written. Inline results go out in a
/// single write, deferred results through [`transmit`].
pub fn handle<P, T, F>(
    cx: &Context,
    function: &str,
    mut w: Box<dyn IndexWrite>,
    mut r: Box<dyn IndexRead>,
    config: &CodecConfig,
    f: F,
) -> Result<()>
where
    P: DecodeParams,
    T: EncodeResults,
    F: FnOnce(&Context, P) -> HandlerResult<T>,
{
    let params = P::decode_params(&mut r, config)?;
    if cx.is_cancelled() {
        debug!(function, "invocation cancelled before handler");
        return Err(InvokeError::Cancelled);
    }

    debug!("calling `{function}` handler");
    let values = f(cx, params).map_err(|source| InvokeError::Handler {
        function: function.to_string(),
        source,
    })?;
    if cx.is_cancelled() {
        debug!(function, "invocation cancelled, dropping result");
        return Err(InvokeError::Cancelled);
    }

    let mut results = ResultSet::new();
    values.encode_results(&mut results)?;
    let (body, pending) = results.partition();

    debug!(len = body.len(), "transmitting `{function}` result");
    if body.is_empty() {
        // zero-length write marks completion for result-less functions
        w.write(&body).map_err(InvokeError::Transmit)?;
    } else {
        w.write_all(&body).map_err(InvokeError::Transmit)?;
    }
    w.flush().map_err(InvokeError::Transmit)?;

    if pending.is_empty() {
        return Ok(());
    }
    transmit(&*w, pending)
}

/// Register `f` as `instance.name` on `server`.
pub fn serve_function<S, P, T, F>(
    server: &S,
    instance: &str,
    name: &str,
    config: CodecConfig,
    f: F,
) -> wrpc_transport::Result<Stop>
where
    S: Serve + ?Sized,
    P: DecodeParams + 'static,
    T: EncodeResults + 'static,
    F: Fn(&Context, P) -> HandlerResult<T> + Send + Sync + 'static,
{
    let function = format!("{instance}.{name}");
    let handler: HandlerFn = Arc::new(
        move |cx: &Context, w: Box<dyn IndexWrite>, r: Box<dyn IndexRead>| -> HandlerResult<()> {
            handle::<P, T, _>(cx, &function, w, r, &config, &f).map_err(|err| {
                warn!(function = %function, error = %err, "invocation failed");
                BoxError::from(err)
            })
        },
    );
    server.serve(instance, name, handler)
}
