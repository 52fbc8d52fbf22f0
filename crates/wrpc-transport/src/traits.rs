use std::io::{Read, Write};
use std::sync::Arc;

use bytes::Bytes;

use crate::context::Context;
use crate::error::{BoxError, Result};

/// Outgoing half of an invocation stream.
///
/// Writes on the stream itself form the primary body. [`IndexWrite::index`]
/// derives a sub-stream addressed by a result position; writes to it are
/// delivered independently of the primary body and of sibling sub-streams.
pub trait IndexWrite: Write + Send {
    /// Derive the sub-stream at `index`.
    fn index(&self, index: u32) -> Result<Box<dyn IndexWrite>>;
}

/// Incoming half of an invocation stream.
pub trait IndexRead: Read + Send {
    /// Derive the sub-stream at `index`.
    fn index(&self, index: u32) -> Result<Box<dyn IndexRead>>;
}

impl<T: IndexWrite + ?Sized> IndexWrite for Box<T> {
    fn index(&self, index: u32) -> Result<Box<dyn IndexWrite>> {
        (**self).index(index)
    }
}

impl<T: IndexRead + ?Sized> IndexRead for Box<T> {
    fn index(&self, index: u32) -> Result<Box<dyn IndexRead>> {
        (**self).index(index)
    }
}

/// Handler registered for one function.
///
/// Receives the invocation context, the outgoing stream for results and the
/// incoming stream carrying encoded parameters.
pub type HandlerFn = Arc<
    dyn Fn(&Context, Box<dyn IndexWrite>, Box<dyn IndexRead>) -> std::result::Result<(), BoxError>
        + Send
        + Sync,
>;

/// Releases one registration.
pub type Stop = Box<dyn FnOnce() -> Result<()> + Send>;

/// Server side of a transport: binds handlers to `(instance, name)` keys.
pub trait Serve {
    /// Register `handler` for the function `name` of `instance`.
    ///
    /// The returned [`Stop`] unregisters it again.
    fn serve(&self, instance: &str, name: &str, handler: HandlerFn) -> Result<Stop>;
}

/// Client side of a transport: sends encoded parameters to a function.
pub trait Invoke {
    /// Invoke `instance.name` with already-encoded `params`.
    ///
    /// Returns the incoming stream carrying the encoded results.
    fn invoke(
        &self,
        cx: &Context,
        instance: &str,
        name: &str,
        params: Bytes,
    ) -> Result<Box<dyn IndexRead>>;
}

impl<T: Serve + ?Sized> Serve for Arc<T> {
    fn serve(&self, instance: &str, name: &str, handler: HandlerFn) -> Result<Stop> {
        (**self).serve(instance, name, handler)
    }
}

impl<T: Invoke + ?Sized> Invoke for Arc<T> {
    fn invoke(
        &self,
        cx: &Context,
        instance: &str,
        name: &str,
        params: Bytes,
    ) -> Result<Box<dyn IndexRead>> {
        (**self).invoke(cx, instance, name, params)
    }
}
