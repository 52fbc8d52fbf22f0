use std::io::Read;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::config::CodecConfig;
use crate::deferred::DeferredWrite;
use crate::error::{CodecError, Result};
use crate::varint::{read_byte, read_discriminant, read_uvarint, write_uvarint};

const INITIAL_STRING_CAPACITY: usize = 64 * 1024;

/// A value that can be written to the wire.
///
/// Inline encodings are appended to `dst`. A value whose content travels on
/// an indexed sub-stream returns the [`DeferredWrite`] producing it; the
/// caller decides which index that write is bound to.
pub trait Encode {
    fn encode(self, dst: &mut BytesMut) -> Result<Option<DeferredWrite>>;
}

/// A value that can be read from the wire.
pub trait Decode: Sized {
    fn decode<R: Read + ?Sized>(r: &mut R, config: &CodecConfig) -> Result<Self>;
}

impl Encode for bool {
    fn encode(self, dst: &mut BytesMut) -> Result<Option<DeferredWrite>> {
        dst.put_u8(u8::from(self));
        Ok(None)
    }
}

impl Decode for bool {
    fn decode<R: Read + ?Sized>(r: &mut R, _config: &CodecConfig) -> Result<Self> {
        match read_byte(r).map_err(|err| CodecError::io("failed to read bool byte", err))? {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            Some(other) => Err(CodecError::InvalidBool(other)),
            None => Err(CodecError::Eof),
        }
    }
}

// u8 is a raw byte, not a varint.
impl Encode for u8 {
    fn encode(self, dst: &mut BytesMut) -> Result<Option<DeferredWrite>> {
        dst.put_u8(self);
        Ok(None)
    }
}

impl Decode for u8 {
    fn decode<R: Read + ?Sized>(r: &mut R, _config: &CodecConfig) -> Result<Self> {
        read_byte(r)
            .map_err(|err| CodecError::io("failed to read u8", err))?
            .ok_or(CodecError::Eof)
    }
}

macro_rules! impl_varint {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                fn encode(self, dst: &mut BytesMut) -> Result<Option<DeferredWrite>> {
                    write_uvarint(u64::from(self), dst);
                    Ok(None)
                }
            }

            impl Decode for $ty {
                fn decode<R: Read + ?Sized>(r: &mut R, _config: &CodecConfig) -> Result<Self> {
                    // read_uvarint bounds the value to the type's width.
                    read_uvarint(r, <$ty>::BITS).map(|v| v as $ty)
                }
            }
        )*
    };
}

impl_varint!(u16, u32, u64);

/// Append a varint byte length followed by `bytes`.
fn encode_byte_string(bytes: &[u8], dst: &mut BytesMut) -> Result<()> {
    let len = bytes.len();
    if len > u32::MAX as usize {
        return Err(CodecError::LengthOverflow { len });
    }
    debug!(len, "writing string byte length");
    write_uvarint(len as u64, dst);
    dst.put_slice(bytes);
    Ok(())
}

/// Read a 32-bit varint length and check it against `max`.
fn read_length<R: Read + ?Sized>(r: &mut R, max: usize) -> Result<usize> {
    let len = read_uvarint(r, u32::BITS)? as usize;
    if len > max {
        return Err(CodecError::LengthLimit { len, max });
    }
    Ok(len)
}

fn decode_byte_string<R: Read + ?Sized>(r: &mut R, config: &CodecConfig) -> Result<Vec<u8>> {
    let len = read_length(r, config.max_string_len)?;
    debug!(len, "reading string bytes");
    // The length is peer-controlled; grow the buffer as bytes arrive.
    let mut buf = Vec::with_capacity(len.min(INITIAL_STRING_CAPACITY));
    (&mut *r)
        .take(len as u64)
        .read_to_end(&mut buf)
        .map_err(|err| CodecError::io("failed to read string bytes", err))?;
    if buf.len() < len {
        return Err(CodecError::UnexpectedEnd);
    }
    Ok(buf)
}

impl Encode for &str {
    fn encode(self, dst: &mut BytesMut) -> Result<Option<DeferredWrite>> {
        encode_byte_string(self.as_bytes(), dst)?;
        Ok(None)
    }
}

impl Encode for String {
    fn encode(self, dst: &mut BytesMut) -> Result<Option<DeferredWrite>> {
        self.as_str().encode(dst)
    }
}

impl Decode for String {
    fn decode<R: Read + ?Sized>(r: &mut R, config: &CodecConfig) -> Result<Self> {
        Ok(String::from_utf8(decode_byte_string(r, config)?)?)
    }
}

impl Encode for Bytes {
    fn encode(self, dst: &mut BytesMut) -> Result<Option<DeferredWrite>> {
        encode_byte_string(&self, dst)?;
        Ok(None)
    }
}

impl Decode for Bytes {
    fn decode<R: Read + ?Sized>(r: &mut R, config: &CodecConfig) -> Result<Self> {
        decode_byte_string(r, config).map(Bytes::from)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(self, dst: &mut BytesMut) -> Result<Option<DeferredWrite>> {
        match self {
            None => {
                dst.put_u8(0);
                Ok(None)
            }
            Some(value) => {
                dst.put_u8(1);
                value.encode(dst)
            }
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode<R: Read + ?Sized>(r: &mut R, config: &CodecConfig) -> Result<Self> {
        match read_discriminant(r)? {
            0 => Ok(None),
            1 => match T::decode(r, config) {
                Ok(value) => Ok(Some(value)),
                Err(CodecError::Eof) => Err(CodecError::UnexpectedEnd),
                Err(err) => Err(err),
            },
            other => Err(CodecError::UnknownDiscriminant(other)),
        }
    }
}

/// `list<T>`: varint element count, then each element.
///
/// Elements that defer their content are written to the list's sub-stream
/// indexed again by element position.
impl<T: Encode> Encode for Vec<T> {
    fn encode(self, dst: &mut BytesMut) -> Result<Option<DeferredWrite>> {
        let len = self.len();
        if len > u32::MAX as usize {
            return Err(CodecError::LengthOverflow { len });
        }
        write_uvarint(len as u64, dst);

        let mut nested = Vec::new();
        for (i, item) in self.into_iter().enumerate() {
            if let Some(write) = item.encode(dst)? {
                nested.push((i as u32, write));
            }
        }
        if nested.is_empty() {
            return Ok(None);
        }
        Ok(Some(DeferredWrite::new(move |w| {
            for (i, write) in nested {
                let sub = w.index(i)?;
                write.run(sub)?;
            }
            Ok(())
        })))
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode<R: Read + ?Sized>(r: &mut R, config: &CodecConfig) -> Result<Self> {
        let len = read_length(r, config.max_list_len)?;
        let mut items = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            match T::decode(r, config) {
                Ok(item) => items.push(item),
                Err(CodecError::Eof) => return Err(CodecError::UnexpectedEnd),
                Err(err) => return Err(err),
            }
        }
        Ok(items)
    }
}
