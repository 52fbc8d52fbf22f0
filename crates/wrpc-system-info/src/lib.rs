//! Bindings for the `wasmcloud:example/system-info` interface.
//!
//! ```text
//! interface system-info {
//!     enum kind { OS, ARCH }
//!     request-info: func(kind: kind) -> string;
//!     call: func() -> string;
//! }
//! ```

pub mod client;
pub mod host;
pub mod kind;
pub mod server;

pub use client::{call, request_info};
pub use host::HostInfo;
pub use kind::{Kind, ParseKindError};
pub use server::{serve_interface, Handler};

/// Fully-qualified interface instance name.
pub const INSTANCE: &str = "wasmcloud:example/system-info";

/// Function names exported by the interface.
pub const REQUEST_INFO: &str = "request-info";
pub const CALL: &str = "call";
