use bytes::{Bytes, BytesMut};
use wrpc_codec::Encode;
use wrpc_system_info::Kind;

use crate::cmd::{EncodeArgs, WireType};
use crate::exit::{codec_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_value, OutputFormat, ValueOutput};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = encode_value(args.ty, &args.value)?;
    print_value(
        &ValueOutput {
            ty: args.ty.name(),
            value: args.value.clone(),
            wire: hex::encode(&wire),
            wire_len: wire.len(),
        },
        format,
        &wire,
    );
    Ok(SUCCESS)
}

pub fn encode_value(ty: WireType, value: &str) -> CliResult<Bytes> {
    match ty {
        WireType::Bool => encode(parse::<bool>(ty, value)?),
        WireType::U8 => encode(parse::<u8>(ty, value)?),
        WireType::U16 => encode(parse::<u16>(ty, value)?),
        WireType::U32 => encode(parse::<u32>(ty, value)?),
        WireType::U64 => encode(parse::<u64>(ty, value)?),
        WireType::String => encode(value),
        WireType::Kind => encode(parse::<Kind>(ty, value)?),
    }
}

fn parse<T>(ty: WireType, value: &str) -> CliResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|err| CliError::new(USAGE, format!("invalid {} value `{value}`: {err}", ty.name())))
}

fn encode<T: Encode>(value: T) -> CliResult<Bytes> {
    let mut buf = BytesMut::new();
    match value.encode(&mut buf) {
        Ok(None) => Ok(buf.freeze()),
        Ok(Some(_)) => Err(CliError::new(
            INTERNAL,
            "value needs a sub-stream and has no inline form",
        )),
        Err(err) => Err(codec_error("encode failed", err)),
    }
}
