use std::io::{ErrorKind, Read};

use bytes::{BufMut, BytesMut};
use tracing::trace;

use crate::error::{CodecError, Result};

/// Maximum encoded size of a 32-bit varint.
pub const MAX_VARINT_LEN32: usize = 5;

/// Maximum encoded size of a 64-bit varint.
pub const MAX_VARINT_LEN64: usize = 10;

/// Append `value` as an unsigned LEB128 varint. Returns the encoded length.
///
/// Wire format: 7 payload bits per byte, least significant group first,
/// bit 7 set on every byte except the last.
pub fn write_uvarint(mut value: u64, dst: &mut BytesMut) -> usize {
    dst.reserve(MAX_VARINT_LEN64);
    let mut written = 0;
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        written += 1;
        if value == 0 {
            dst.put_u8(byte);
            return written;
        }
        dst.put_u8(byte | 0x80);
    }
}

/// Read an unsigned LEB128 varint that must fit in `bits` bits.
///
/// At most `ceil(bits / 7)` bytes are consumed. On the last permitted byte
/// only the remaining `bits % 7` payload bits may be set (and the
/// continuation bit must be clear), otherwise the value overflows.
///
/// Returns [`CodecError::Eof`] if the stream is empty before the first byte
/// and [`CodecError::UnexpectedEnd`] if it ends after a continuation byte.
pub fn read_uvarint<R: Read + ?Sized>(r: &mut R, bits: u32) -> Result<u64> {
    read_leb128(r, bits, "failed to read varint byte")
}

/// Read an enum discriminant bounded to 8 bits (at most 2 bytes).
pub fn read_discriminant<R: Read + ?Sized>(r: &mut R) -> Result<u8> {
    match read_leb128(r, u8::BITS, "failed to read discriminant byte") {
        Ok(value) => Ok(value as u8),
        Err(CodecError::IntegerOverflow { bits }) => Err(CodecError::DiscriminantOverflow { bits }),
        Err(err) => Err(err),
    }
}

fn read_leb128<R: Read + ?Sized>(r: &mut R, bits: u32, context: &'static str) -> Result<u64> {
    debug_assert!((1..=64).contains(&bits));

    let mut value = 0u64;
    let mut shift = 0u32;
    for i in 0..bits.div_ceil(7) {
        trace!(i, bits, "reading varint byte");
        let byte = match read_byte(r) {
            Ok(Some(byte)) => byte,
            Ok(None) if i == 0 => return Err(CodecError::Eof),
            Ok(None) => return Err(CodecError::UnexpectedEnd),
            Err(err) => return Err(CodecError::io(context, err)),
        };

        if shift + 7 > bits {
            let max = (1u64 << (bits - shift)) - 1;
            if u64::from(byte) > max {
                return Err(CodecError::IntegerOverflow { bits });
            }
            return Ok(value | u64::from(byte) << shift);
        }
        if byte < 0x80 {
            return Ok(value | u64::from(byte) << shift);
        }
        value |= u64::from(byte & 0x7f) << shift;
        shift += 7;
    }
    Err(CodecError::IntegerOverflow { bits })
}

/// Read one byte, `None` on a clean end of stream.
pub(crate) fn read_byte<R: Read + ?Sized>(r: &mut R) -> std::io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match r.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use proptest::prelude::*;

    use super::*;

    fn encode(value: u64) -> Vec<u8> {
        let mut buf = BytesMut::new();
        write_uvarint(value, &mut buf);
        buf.to_vec()
    }

    #[test]
    fn known_encodings() {
        assert_eq!(encode(0), [0x00]);
        assert_eq!(encode(1), [0x01]);
        assert_eq!(encode(127), [0x7f]);
        assert_eq!(encode(128), [0x80, 0x01]);
        assert_eq!(encode(300), [0xac, 0x02]);
        assert_eq!(encode(u32::MAX as u64), [0xff, 0xff, 0xff, 0xff, 0x0f]);
        assert_eq!(encode(u64::MAX).len(), MAX_VARINT_LEN64);
    }

    #[test]
    fn discriminant_two_bytes_in_range() {
        let mut r = Cursor::new(vec![0x81, 0x01]);
        assert_eq!(read_discriminant(&mut r).unwrap(), 129);

        let mut r = Cursor::new(vec![0xff, 0x01]);
        assert_eq!(read_discriminant(&mut r).unwrap(), 255);
    }

    #[test]
    fn discriminant_second_byte_overflows() {
        for second in [0x02u8, 0x03, 0x7f, 0x80, 0xff] {
            let mut r = Cursor::new(vec![0x80, second]);
            let err = read_discriminant(&mut r).unwrap_err();
            assert!(
                matches!(err, CodecError::DiscriminantOverflow { bits: 8 }),
                "second byte {second:#04x}: {err}"
            );
            assert_eq!(err.to_string(), "discriminant overflows an 8-bit integer");
        }
    }

    #[test]
    fn discriminant_never_reads_a_third_byte() {
        let mut r = Cursor::new(vec![0x80, 0x01, 0x55]);
        assert_eq!(read_discriminant(&mut r).unwrap(), 128);
        assert_eq!(r.position(), 2);
    }

    #[test]
    fn empty_stream_is_clean_eof() {
        let mut r = Cursor::new(Vec::<u8>::new());
        assert!(matches!(read_discriminant(&mut r), Err(CodecError::Eof)));
        assert!(matches!(read_uvarint(&mut r, 32), Err(CodecError::Eof)));
    }

    #[test]
    fn truncated_after_continuation_is_unexpected_end() {
        let mut r = Cursor::new(vec![0x80]);
        assert!(matches!(
            read_discriminant(&mut r),
            Err(CodecError::UnexpectedEnd)
        ));

        let mut r = Cursor::new(vec![0xff, 0xff]);
        assert!(matches!(
            read_uvarint(&mut r, 32),
            Err(CodecError::UnexpectedEnd)
        ));
    }

    #[test]
    fn u32_fifth_byte_limits() {
        let mut r = Cursor::new(vec![0xff, 0xff, 0xff, 0xff, 0x0f]);
        assert_eq!(read_uvarint(&mut r, 32).unwrap(), u32::MAX as u64);

        let mut r = Cursor::new(vec![0xff, 0xff, 0xff, 0xff, 0x10]);
        assert!(matches!(
            read_uvarint(&mut r, 32),
            Err(CodecError::IntegerOverflow { bits: 32 })
        ));
    }

    #[test]
    fn read_error_carries_context() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::ConnectionReset))
            }
        }

        let err = read_discriminant(&mut Broken).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("failed to read discriminant byte"));
    }

    #[test]
    fn interrupted_read_retries() {
        struct InterruptedOnce {
            interrupted: bool,
            inner: Cursor<Vec<u8>>,
        }
        impl Read for InterruptedOnce {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(std::io::Error::from(ErrorKind::Interrupted));
                }
                self.inner.read(buf)
            }
        }

        let mut r = InterruptedOnce {
            interrupted: false,
            inner: Cursor::new(vec![0x01]),
        };
        assert_eq!(read_discriminant(&mut r).unwrap(), 1);
    }

    proptest! {
        #[test]
        fn single_byte_discriminant_is_its_low_bits(byte in 0u8..0x80, tail in any::<u8>()) {
            let mut r = Cursor::new(vec![byte, tail]);
            prop_assert_eq!(read_discriminant(&mut r).unwrap(), byte);
            prop_assert_eq!(r.position(), 1);
        }

        #[test]
        fn u64_roundtrip(value in any::<u64>()) {
            let mut r = Cursor::new(encode(value));
            prop_assert_eq!(read_uvarint(&mut r, 64).unwrap(), value);
        }

        #[test]
        fn u32_values_never_exceed_five_bytes(value in any::<u32>()) {
            let bytes = encode(u64::from(value));
            prop_assert!(bytes.len() <= MAX_VARINT_LEN32);
            prop_assert_eq!(read_uvarint(&mut Cursor::new(bytes), 32).unwrap(), u64::from(value));
        }
    }
}
