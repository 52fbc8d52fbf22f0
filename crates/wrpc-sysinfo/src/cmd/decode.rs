use std::io::Cursor;

use wrpc_codec::{CodecConfig, Decode};
use wrpc_system_info::Kind;

use crate::cmd::{DecodeArgs, WireType};
use crate::exit::{codec_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_value, OutputFormat, ValueOutput};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = hex::decode(args.hex.trim())
        .map_err(|err| CliError::new(USAGE, format!("invalid hex input: {err}")))?;

    let mut config = CodecConfig::default();
    if let Some(max) = args.max_string_len {
        config.max_string_len = max;
    }

    let (value, consumed) = decode_value(args.ty, &wire, &config)?;
    if args.exact && consumed < wire.len() {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{} trailing bytes after value", wire.len() - consumed),
        ));
    }

    let used = &wire[..consumed];
    print_value(
        &ValueOutput {
            ty: args.ty.name(),
            value,
            wire: hex::encode(used),
            wire_len: consumed,
        },
        format,
        used,
    );
    Ok(SUCCESS)
}

/// Decode one value of type `ty` from the front of `wire`.
///
/// Returns the value in text form and the number of bytes it occupied.
pub fn decode_value(
    ty: WireType,
    wire: &[u8],
    config: &CodecConfig,
) -> CliResult<(String, usize)> {
    let mut r = Cursor::new(wire);
    let value = match ty {
        WireType::Bool => decode::<bool>(&mut r, config)?.to_string(),
        WireType::U8 => decode::<u8>(&mut r, config)?.to_string(),
        WireType::U16 => decode::<u16>(&mut r, config)?.to_string(),
        WireType::U32 => decode::<u32>(&mut r, config)?.to_string(),
        WireType::U64 => decode::<u64>(&mut r, config)?.to_string(),
        WireType::String => decode::<String>(&mut r, config)?,
        WireType::Kind => decode::<Kind>(&mut r, config)?.to_string(),
    };
    Ok((value, r.position() as usize))
}

fn decode<T: Decode>(r: &mut Cursor<&[u8]>, config: &CodecConfig) -> CliResult<T> {
    T::decode(r, config).map_err(|err| codec_error("decode failed", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_hex(ty: WireType, hex: &str) -> CliResult<(String, usize)> {
        decode_value(ty, &hex::decode(hex).unwrap(), &CodecConfig::default())
    }

    #[test]
    fn decodes_kind_names() {
        assert_eq!(decode_hex(WireType::Kind, "00").unwrap(), ("OS".to_string(), 1));
        assert_eq!(decode_hex(WireType::Kind, "01").unwrap(), ("ARCH".to_string(), 1));
    }

    #[test]
    fn decodes_string_and_reports_consumed() {
        let (value, consumed) = decode_hex(WireType::String, "046c696e7578").unwrap();
        assert_eq!(value, "linu");
        assert_eq!(consumed, 5);
    }

    #[test]
    fn overflowing_kind_is_data_invalid() {
        let err = decode_hex(WireType::Kind, "8002").unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.contains("discriminant overflows an 8-bit integer"));
    }

    #[test]
    fn unknown_kind_is_data_invalid() {
        let err = decode_hex(WireType::Kind, "02").unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.ends_with("unknown discriminant value 2"));
    }
}
