use std::sync::Arc;

use tracing::debug;
use wrpc_runtime::{HandlerResult, ServeConfig, ServeError, ServeSet, StopHandle};
use wrpc_transport::{Context, Serve};

use crate::kind::Kind;
use crate::{CALL, INSTANCE, REQUEST_INFO};

/// Implementation of the system-info interface.
pub trait Handler: Send + Sync + 'static {
    fn request_info(&self, cx: &Context, kind: Kind) -> HandlerResult<String>;

    fn call(&self, cx: &Context) -> HandlerResult<String>;
}

/// Serve every system-info function from `handler` on `server`.
///
/// The returned handle stops `request-info` and then `call`. If a
/// registration fails, the error carries the stops for what was already
/// registered.
pub fn serve_interface<S, H>(
    server: &S,
    handler: Arc<H>,
    config: ServeConfig,
) -> Result<StopHandle, ServeError>
where
    S: Serve + ?Sized,
    H: Handler,
{
    let info = Arc::clone(&handler);
    let stop = ServeSet::new(server, INSTANCE, config)
        .serve(REQUEST_INFO, move |cx, (kind,): (Kind,)| {
            debug!(%kind, "request-info");
            info.request_info(cx, kind).map(|s| (s,))
        })?
        .serve(CALL, move |cx, (): ()| handler.call(cx).map(|s| (s,)))?
        .finish();
    Ok(stop)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use bytes::Bytes;
    use wrpc_runtime::InvokeError;
    use wrpc_transport::{Invoke, MemoryServer, TransportError};

    use super::*;

    struct Fixed;

    impl Handler for Fixed {
        fn request_info(&self, _cx: &Context, kind: Kind) -> HandlerResult<String> {
            match kind {
                Kind::Os => Ok("linux".to_string()),
                Kind::Arch => Err("arch unavailable".into()),
            }
        }

        fn call(&self, _cx: &Context) -> HandlerResult<String> {
            Ok("pong".to_string())
        }
    }

    fn raw_invoke(
        server: &MemoryServer,
        name: &str,
        params: &'static [u8],
    ) -> wrpc_transport::Result<Vec<u8>> {
        let mut r = server.invoke(
            &Context::new(),
            INSTANCE,
            name,
            Bytes::from_static(params),
        )?;
        let mut out = Vec::new();
        r.read_to_end(&mut out)?;
        Ok(out)
    }

    #[test]
    fn request_info_os_writes_length_prefixed_string() {
        let server = MemoryServer::new();
        let _stop = serve_interface(&server, Arc::new(Fixed), ServeConfig::default()).unwrap();

        let out = raw_invoke(&server, REQUEST_INFO, b"\x00").unwrap();
        assert_eq!(out, b"\x05linux");
    }

    #[test]
    fn call_writes_pong() {
        let server = MemoryServer::new();
        let _stop = serve_interface(&server, Arc::new(Fixed), ServeConfig::default()).unwrap();

        let out = raw_invoke(&server, CALL, b"").unwrap();
        assert_eq!(out, [4, b'p', b'o', b'n', b'g']);
    }

    #[test]
    fn handler_error_is_wrapped_with_function_name() {
        let server = MemoryServer::new();
        let _stop = serve_interface(&server, Arc::new(Fixed), ServeConfig::default()).unwrap();

        let err = raw_invoke(&server, REQUEST_INFO, b"\x01").unwrap_err();
        let TransportError::Invocation(source) = err else {
            panic!("unexpected error: {err}");
        };
        let invoke = source.downcast_ref::<InvokeError>().unwrap();
        assert!(matches!(invoke, InvokeError::Handler { function, .. }
            if function == "wasmcloud:example/system-info.request-info"));
    }

    #[test]
    fn unknown_kind_never_reaches_handler() {
        let server = MemoryServer::new();
        let _stop = serve_interface(&server, Arc::new(Fixed), ServeConfig::default()).unwrap();

        let err = raw_invoke(&server, REQUEST_INFO, b"\x02").unwrap_err();
        assert!(err
            .to_string()
            .contains("failed to read parameter 0: unknown discriminant value 2"));
    }

    #[test]
    fn registration_conflict_reports_function() {
        let server = MemoryServer::new();
        let _existing = wrpc_runtime::serve_function(
            &server,
            INSTANCE,
            CALL,
            Default::default(),
            |_cx, (): ()| Ok((String::from("taken"),)),
        )
        .unwrap();

        let err = serve_interface(&server, Arc::new(Fixed), ServeConfig::default()).unwrap_err();
        assert_eq!(err.function, "wasmcloud:example/system-info.call");
        assert_eq!(
            err.registered.functions().collect::<Vec<_>>(),
            vec!["wasmcloud:example/system-info.request-info"]
        );
        err.registered.stop().unwrap();
        assert_eq!(
            server.served(),
            vec![(INSTANCE.to_string(), CALL.to_string())]
        );
    }
}
