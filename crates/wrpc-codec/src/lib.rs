//! Binary value encoding for wRPC parameters and results.
//!
//! Values are self-delimiting on the wire:
//! - unsigned integers and lengths use LEB128 varints
//! - strings and byte buffers are a varint byte length followed by the bytes
//! - enum discriminants are varints bounded by the enum's bit width
//!
//! Values that cannot be sent inline (see [`ByteStream`]) encode to a
//! [`DeferredWrite`] that is run later against an indexed sub-stream.

pub mod config;
pub mod deferred;
pub mod enumeration;
pub mod error;
pub mod value;
pub mod varint;

pub use config::CodecConfig;
pub use deferred::{
    read_byte_stream, ByteStream, DeferredWrite, PendingWrite, ResultPart, ResultSet,
    DEFAULT_STREAM_CHUNK_SIZE,
};
pub use enumeration::{decode_enum, encode_enum, write_enum, Enumeration};
pub use error::{CodecError, Result};
pub use value::{Decode, Encode};
pub use varint::{
    read_discriminant, read_uvarint, write_uvarint, MAX_VARINT_LEN32, MAX_VARINT_LEN64,
};
