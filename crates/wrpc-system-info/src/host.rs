use tracing::debug;
use wrpc_runtime::HandlerResult;
use wrpc_transport::Context;

use crate::kind::Kind;
use crate::server::Handler;

/// Answers system-info requests about the current host.
///
/// `request-info` reports the compile-time target OS and architecture
/// (`linux`, `x86_64`, ...). `call` returns a fixed reply, `"pong"` unless
/// configured otherwise.
#[derive(Debug, Clone)]
pub struct HostInfo {
    reply: String,
}

impl HostInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }

    /// The value reported for `kind`.
    pub fn info(kind: Kind) -> &'static str {
        match kind {
            Kind::Os => std::env::consts::OS,
            Kind::Arch => std::env::consts::ARCH,
        }
    }
}

impl Default for HostInfo {
    fn default() -> Self {
        Self::with_reply("pong")
    }
}

impl Handler for HostInfo {
    fn request_info(&self, _cx: &Context, kind: Kind) -> HandlerResult<String> {
        let info = Self::info(kind);
        debug!(%kind, info, "answering request-info");
        Ok(info.to_string())
    }

    fn call(&self, _cx: &Context) -> HandlerResult<String> {
        Ok(self.reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_target_constants() {
        let host = HostInfo::new();
        let cx = Context::new();
        assert_eq!(
            host.request_info(&cx, Kind::Os).unwrap(),
            std::env::consts::OS
        );
        assert_eq!(
            host.request_info(&cx, Kind::Arch).unwrap(),
            std::env::consts::ARCH
        );
    }

    #[test]
    fn default_reply_is_pong() {
        assert_eq!(HostInfo::default().call(&Context::new()).unwrap(), "pong");
        assert_eq!(
            HostInfo::with_reply("hi").call(&Context::new()).unwrap(),
            "hi"
        );
    }
}
