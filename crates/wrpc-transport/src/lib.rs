//! Indexed byte-stream transport abstraction.
//!
//! An invocation is carried by a pair of ordered byte streams. Either side
//! can derive an independently addressable sub-stream from its stream with
//! [`IndexWrite::index`] / [`IndexRead::index`]; nested result values that
//! are not sent inline travel on those sub-streams.
//!
//! This is the lowest layer of the workspace. Network transports live
//! outside of it; [`memory`] provides an in-process implementation.

pub mod context;
pub mod error;
pub mod memory;
pub mod traits;

pub use context::Context;
pub use error::{BoxError, Result, TransportError};
pub use memory::{MemoryReader, MemoryServer, MemoryWriter};
pub use traits::{HandlerFn, IndexRead, IndexWrite, Invoke, Serve, Stop};
