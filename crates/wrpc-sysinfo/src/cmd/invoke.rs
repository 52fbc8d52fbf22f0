use std::io::Read;
use std::sync::Arc;

use bytes::BytesMut;
use tracing::debug;
use wrpc_codec::{CodecConfig, Decode};
use wrpc_runtime::{EncodeParams, ServeConfig};
use wrpc_system_info::{serve_interface, HostInfo, Kind, CALL, INSTANCE, REQUEST_INFO};
use wrpc_transport::{Context, Invoke, MemoryServer};

use crate::cmd::{CallArgs, RequestInfoArgs};
use crate::exit::{
    codec_error, invoke_error, io_error, serve_error, transport_error, CliError, CliResult,
    SUCCESS, USAGE,
};
use crate::output::{print_invocation, InvocationOutput, OutputFormat};

pub fn request_info(args: RequestInfoArgs, format: OutputFormat) -> CliResult<i32> {
    let kind: Kind = args
        .kind
        .parse()
        .map_err(|err| CliError::new(USAGE, format!("{err}")))?;

    let (wire, value) = invoke_host(HostInfo::new(), REQUEST_INFO, (kind,))?;
    let params = kind.to_string();
    print_invocation(
        &InvocationOutput {
            function: format!("{INSTANCE}.{REQUEST_INFO}"),
            params: &params,
            value: &value,
            wire: hex::encode(&wire),
        },
        format,
    );
    Ok(SUCCESS)
}

pub fn call(args: CallArgs, format: OutputFormat) -> CliResult<i32> {
    let (wire, value) = invoke_host(HostInfo::with_reply(args.reply), CALL, ())?;
    print_invocation(
        &InvocationOutput {
            function: format!("{INSTANCE}.{CALL}"),
            params: "",
            value: &value,
            wire: hex::encode(&wire),
        },
        format,
    );
    Ok(SUCCESS)
}

/// Serve `handler` in-process, invoke `name` once and return the raw result
/// body together with the decoded string.
fn invoke_host<P: EncodeParams>(
    handler: HostInfo,
    name: &str,
    params: P,
) -> CliResult<(Vec<u8>, String)> {
    invoke_on(&MemoryServer::new(), handler, name, params)
}

/// Registrations are stopped whether or not the invocation succeeds.
fn invoke_on<P: EncodeParams>(
    server: &MemoryServer,
    handler: HostInfo,
    name: &str,
    params: P,
) -> CliResult<(Vec<u8>, String)> {
    let stop = serve_interface(server, Arc::new(handler), ServeConfig::default())
        .map_err(|err| serve_error("serve failed", err))?;

    let outcome = invoke_once(server, name, params);
    let stopped = stop
        .stop()
        .map_err(|err| transport_error("stop failed", err));
    let result = outcome?;
    stopped?;
    Ok(result)
}

fn invoke_once<P: EncodeParams>(
    server: &MemoryServer,
    name: &str,
    params: P,
) -> CliResult<(Vec<u8>, String)> {
    let mut buf = BytesMut::new();
    params
        .encode_params(&mut buf)
        .map_err(|err| invoke_error("encode failed", err))?;

    let cx = Context::new();
    let mut r = server
        .invoke(&cx, INSTANCE, name, buf.freeze())
        .map_err(|err| transport_error("invoke failed", err))?;
    let mut wire = Vec::new();
    r.read_to_end(&mut wire)
        .map_err(|err| io_error("read failed", err))?;
    debug!(name, len = wire.len(), "received result");

    let value = String::decode(&mut wire.as_slice(), &CodecConfig::default())
        .map_err(|err| codec_error("decode failed", err))?;
    Ok((wire, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_info_os_matches_host() {
        let (wire, value) = invoke_host(HostInfo::new(), REQUEST_INFO, (Kind::Os,)).unwrap();
        assert_eq!(value, std::env::consts::OS);
        assert_eq!(wire[0] as usize, value.len());
        assert_eq!(&wire[1..], value.as_bytes());
    }

    #[test]
    fn call_uses_configured_reply() {
        let (wire, value) = invoke_host(HostInfo::with_reply("pong"), CALL, ()).unwrap();
        assert_eq!(value, "pong");
        assert_eq!(wire, b"\x04pong");
    }

    #[test]
    fn unknown_function_maps_to_transport_code() {
        let err = invoke_host(HostInfo::new(), "missing", ()).unwrap_err();
        assert_eq!(err.code, crate::exit::TRANSPORT_ERROR);
    }

    #[test]
    fn failed_invocation_still_stops_registrations() {
        let server = MemoryServer::new();
        let err = invoke_on(&server, HostInfo::new(), "missing", ()).unwrap_err();
        assert_eq!(err.code, crate::exit::TRANSPORT_ERROR);
        assert!(server.served().is_empty());

        let err = invoke_on(&server, HostInfo::new(), REQUEST_INFO, ()).unwrap_err();
        assert_ne!(err.code, SUCCESS);
        assert!(server.served().is_empty());
    }
}
