use std::fmt;
use std::io::Read;
use std::str::FromStr;

use bytes::BytesMut;
use wrpc_codec::{
    decode_enum, encode_enum, CodecConfig, CodecError, Decode, DeferredWrite, Encode, Enumeration,
};

/// What [`request-info`](crate::REQUEST_INFO) reports on.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Operating system name.
    Os = 0,
    /// CPU architecture.
    Arch = 1,
}

impl TryFrom<u8> for Kind {
    type Error = CodecError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Kind::Os),
            1 => Ok(Kind::Arch),
            other => Err(CodecError::UnknownDiscriminant(other)),
        }
    }
}

impl From<Kind> for u8 {
    fn from(kind: Kind) -> u8 {
        kind as u8
    }
}

impl Enumeration for Kind {
    const VARIANTS: &'static [Self] = &[Kind::Os, Kind::Arch];

    fn discriminant(self) -> u8 {
        self.into()
    }

    fn name(self) -> &'static str {
        match self {
            Kind::Os => "OS",
            Kind::Arch => "ARCH",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error when parsing a [`Kind`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown kind `{0}` (expected OS or ARCH)")]
pub struct ParseKindError(pub String);

impl FromStr for Kind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::from_name(s).ok_or_else(|| ParseKindError(s.to_string()))
    }
}

impl Encode for Kind {
    fn encode(self, dst: &mut BytesMut) -> wrpc_codec::Result<Option<DeferredWrite>> {
        encode_enum(self, dst);
        Ok(None)
    }
}

impl Decode for Kind {
    fn decode<R: Read + ?Sized>(r: &mut R, _config: &CodecConfig) -> wrpc_codec::Result<Self> {
        decode_enum(r)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn decode(bytes: &[u8]) -> wrpc_codec::Result<Kind> {
        Kind::decode(&mut Cursor::new(bytes), &CodecConfig::default())
    }

    #[test]
    fn wire_values() {
        for (kind, byte) in [(Kind::Os, 0u8), (Kind::Arch, 1u8)] {
            let mut buf = BytesMut::new();
            assert!(kind.encode(&mut buf).unwrap().is_none());
            assert_eq!(&buf[..], [byte]);
            assert_eq!(decode(&[byte]).unwrap(), kind);
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(Kind::Os.to_string(), "OS");
        assert_eq!(Kind::Arch.to_string(), "ARCH");
    }

    #[test]
    fn unknown_discriminant() {
        let err = decode(&[2]).unwrap_err();
        assert!(matches!(err, CodecError::UnknownDiscriminant(2)));
        assert!(matches!(Kind::try_from(200), Err(CodecError::UnknownDiscriminant(200))));
    }

    #[test]
    fn two_byte_discriminant_in_range_is_still_unknown() {
        assert!(matches!(
            decode(&[0x80, 0x01]),
            Err(CodecError::UnknownDiscriminant(128))
        ));
    }

    #[test]
    fn overflow_and_truncation() {
        assert!(matches!(
            decode(&[0x80, 0x02]),
            Err(CodecError::DiscriminantOverflow { bits: 8 })
        ));
        assert!(matches!(decode(&[0x81]), Err(CodecError::UnexpectedEnd)));
        assert!(matches!(decode(&[]), Err(CodecError::Eof)));
    }

    #[test]
    fn parse_from_text() {
        assert_eq!("os".parse::<Kind>().unwrap(), Kind::Os);
        assert_eq!("ARCH".parse::<Kind>().unwrap(), Kind::Arch);
        let err = "cpu".parse::<Kind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown kind `cpu` (expected OS or ARCH)");
    }
}
