//! Calling a remote system-info instance.

use wrpc_codec::CodecConfig;
use wrpc_runtime::{invoke, InvokeError};
use wrpc_transport::{Context, Invoke};

use crate::kind::Kind;
use crate::{CALL, INSTANCE, REQUEST_INFO};

pub fn request_info<I: Invoke + ?Sized>(
    client: &I,
    cx: &Context,
    kind: Kind,
) -> Result<String, InvokeError> {
    let (info,) = invoke(
        client,
        cx,
        INSTANCE,
        REQUEST_INFO,
        (kind,),
        &CodecConfig::default(),
    )?;
    Ok(info)
}

pub fn call<I: Invoke + ?Sized>(client: &I, cx: &Context) -> Result<String, InvokeError> {
    let (reply,) = invoke(client, cx, INSTANCE, CALL, (), &CodecConfig::default())?;
    Ok(reply)
}
