//! Enumerated types: closed variant sets identified by a varint discriminant.

use std::io::Write;

use bytes::BytesMut;
use tracing::trace;

use crate::error::{CodecError, Result};
use crate::varint::{read_discriminant, write_uvarint, MAX_VARINT_LEN32};

/// A WIT `enum`: variants map 1:1 onto discriminants starting at 0.
///
/// Conversion from a raw discriminant is fallible, so a value of the type is
/// always one of [`Enumeration::VARIANTS`] and [`Enumeration::name`] is total.
pub trait Enumeration: Copy + TryFrom<u8, Error = CodecError> + 'static {
    /// Every variant, in discriminant order.
    const VARIANTS: &'static [Self];

    fn discriminant(self) -> u8;

    /// Canonical name, used for display only.
    fn name(self) -> &'static str;

    /// Look a variant up by its canonical name, ignoring ASCII case.
    fn from_name(name: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.name().eq_ignore_ascii_case(name))
    }
}

/// Append the discriminant of `value`.
pub fn encode_enum<E: Enumeration>(value: E, dst: &mut BytesMut) {
    write_uvarint(u64::from(value.discriminant()), dst);
}

/// Write the discriminant of `value` straight to `w`.
pub fn write_enum<E: Enumeration, W: Write + ?Sized>(value: E, w: &mut W) -> Result<()> {
    let mut buf = BytesMut::with_capacity(MAX_VARINT_LEN32);
    encode_enum(value, &mut buf);
    w.write_all(&buf)
        .map_err(|err| CodecError::io("failed to write discriminant", err))
}

/// Read a discriminant and map it to a variant of `E`.
pub fn decode_enum<E: Enumeration, R: std::io::Read + ?Sized>(r: &mut R) -> Result<E> {
    let raw = read_discriminant(r)?;
    trace!(raw, "read discriminant");
    E::try_from(raw)
}
