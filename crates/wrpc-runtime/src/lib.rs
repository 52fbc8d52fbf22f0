//! Typed function dispatch over indexed byte streams.
//!
//! A served function decodes its parameters from the inbound stream, calls
//! a user handler, writes inline results to the outbound stream in one write
//! and delivers deferred results on indexed sub-streams concurrently.

pub mod client;
pub mod dispatch;
pub mod error;
pub mod server;
pub mod transmit;

pub use client::{invoke, DecodeResult, DecodeResults, EncodeParams, StreamBytes};
pub use dispatch::{handle, serve_function, DecodeParams, EncodeResults, HandlerResult};
pub use error::{InvokeError, Result, ServeError};
pub use server::{ServeConfig, ServeSet, StopHandle};
pub use transmit::transmit;
