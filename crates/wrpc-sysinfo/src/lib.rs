//! Typed remote function invocation over indexed byte streams.
//!
//! # Crate Structure
//!
//! - [`transport`]: stream traits, invocation context, in-memory transport
//! - [`codec`]: varint value encoding and enumerated types
//! - [`runtime`]: function dispatch, result transmission, serving
//! - [`system_info`]: the `wasmcloud:example/system-info` interface

/// Re-export transport types.
pub mod transport {
    pub use wrpc_transport::*;
}

/// Re-export codec types.
pub mod codec {
    pub use wrpc_codec::*;
}

/// Re-export runtime types.
pub mod runtime {
    pub use wrpc_runtime::*;
}

/// Re-export the system-info bindings.
pub mod system_info {
    pub use wrpc_system_info::*;
}
