//! Calling served functions through an [`Invoke`] transport.

use bytes::{Bytes, BytesMut};
use tracing::debug;
use wrpc_codec::{read_byte_stream, CodecConfig, CodecError, Decode, Encode};
use wrpc_transport::{Context, IndexRead, Invoke};

use crate::error::{InvokeError, Result};

/// Parameters encoded for an outgoing invocation.
///
/// Parameters travel in one buffer, so values that would need a sub-stream
/// are rejected with [`InvokeError::DeferredParameter`].
pub trait EncodeParams {
    fn encode_params(self, dst: &mut BytesMut) -> Result<()>;
}

/// One result value read back from an invocation.
pub trait DecodeResult: Sized {
    fn decode_result(r: &mut dyn IndexRead, index: u32, config: &CodecConfig)
        -> wrpc_codec::Result<Self>;
}

/// A function's whole result tuple.
pub trait DecodeResults: Sized {
    fn decode_results(r: &mut dyn IndexRead, config: &CodecConfig) -> Result<Self>;
}

/// The content of a streamed result, collected from its sub-stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamBytes(pub Bytes);

impl DecodeResult for StreamBytes {
    fn decode_result(
        r: &mut dyn IndexRead,
        index: u32,
        config: &CodecConfig,
    ) -> wrpc_codec::Result<Self> {
        let mut sub = r.index(index)?;
        read_byte_stream(&mut sub, config).map(StreamBytes)
    }
}

macro_rules! impl_decode_result_inline {
    ($($ty:ty),*) => {
        $(
            impl DecodeResult for $ty {
                fn decode_result(
                    r: &mut dyn IndexRead,
                    _index: u32,
                    config: &CodecConfig,
                ) -> wrpc_codec::Result<Self> {
                    <$ty as Decode>::decode(r, config)
                }
            }
        )*
    };
}

impl_decode_result_inline!(bool, u8, u16, u32, u64, String, Bytes);

impl<T: Decode> DecodeResult for Option<T> {
    fn decode_result(
        r: &mut dyn IndexRead,
        _index: u32,
        config: &CodecConfig,
    ) -> wrpc_codec::Result<Self> {
        Option::<T>::decode(r, config)
    }
}

impl<T: Decode> DecodeResult for Vec<T> {
    fn decode_result(
        r: &mut dyn IndexRead,
        _index: u32,
        config: &CodecConfig,
    ) -> wrpc_codec::Result<Self> {
        Vec::<T>::decode(r, config)
    }
}

fn encode_param<T: Encode>(value: T, index: u32, dst: &mut BytesMut) -> Result<()> {
    match value.encode(dst) {
        Ok(None) => Ok(()),
        Ok(Some(_)) => Err(InvokeError::DeferredParameter(index)),
        Err(source) => Err(InvokeError::ParameterEncode { index, source }),
    }
}

fn decode_result<T: DecodeResult>(
    r: &mut dyn IndexRead,
    index: u32,
    config: &CodecConfig,
) -> Result<T> {
    T::decode_result(r, index, config).map_err(|source| {
        let source = match source {
            CodecError::Eof => CodecError::UnexpectedEnd,
            other => other,
        };
        InvokeError::ResultDecode { index, source }
    })
}

impl EncodeParams for () {
    fn encode_params(self, _dst: &mut BytesMut) -> Result<()> {
        Ok(())
    }
}

impl DecodeResults for () {
    fn decode_results(_r: &mut dyn IndexRead, _config: &CodecConfig) -> Result<Self> {
        Ok(())
    }
}

macro_rules! impl_client_tuples {
    ($(($($idx:tt $ty:ident),+))*) => {
        $(
            impl<$($ty: Encode),+> EncodeParams for ($($ty,)+) {
                fn encode_params(self, dst: &mut BytesMut) -> Result<()> {
                    $(encode_param(self.$idx, $idx, dst)?;)+
                    Ok(())
                }
            }

            impl<$($ty: DecodeResult),+> DecodeResults for ($($ty,)+) {
                fn decode_results(r: &mut dyn IndexRead, config: &CodecConfig) -> Result<Self> {
                    Ok(($(decode_result::<$ty>(r, $idx, config)?,)+))
                }
            }
        )*
    };
}

impl_client_tuples! {
    (0 A)
    (0 A, 1 B)
    (0 A, 1 B, 2 C)
    (0 A, 1 B, 2 C, 3 D)
}

/// Invoke `instance.name` with `params` and decode its results.
pub fn invoke<I, P, T>(
    client: &I,
    cx: &Context,
    instance: &str,
    name: &str,
    params: P,
    config: &CodecConfig,
) -> Result<T>
where
    I: Invoke + ?Sized,
    P: EncodeParams,
    T: DecodeResults,
{
    let mut buf = BytesMut::new();
    params.encode_params(&mut buf)?;
    debug!(instance, name, len = buf.len(), "invoking");
    let mut r = client.invoke(cx, instance, name, buf.freeze())?;
    T::decode_results(r.as_mut(), config)
}
