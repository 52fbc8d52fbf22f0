//! Deferred result components and the inline/deferred partition.
//!
//! Most values encode straight into the primary body. A [`ByteStream`]
//! instead produces a [`DeferredWrite`] that is later run against the
//! sub-stream indexed by its result position.

use std::fmt;
use std::io::{ErrorKind, Read, Write};

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};
use wrpc_transport::IndexWrite;

use crate::config::CodecConfig;
use crate::error::{CodecError, Result};
use crate::value::{Decode, Encode};
use crate::varint::write_uvarint;

/// Default chunk size for [`ByteStream`] transmission: 8 KiB.
pub const DEFAULT_STREAM_CHUNK_SIZE: usize = 8 * 1024;

type WriteFn = Box<dyn FnOnce(Box<dyn IndexWrite>) -> Result<()> + Send>;

/// Encode-and-transmit work for one indexed sub-stream.
pub struct DeferredWrite {
    write: WriteFn,
}

impl DeferredWrite {
    pub fn new<F>(write: F) -> Self
    where
        F: FnOnce(Box<dyn IndexWrite>) -> Result<()> + Send + 'static,
    {
        Self {
            write: Box::new(write),
        }
    }

    /// Run the write against the sub-stream it is bound to.
    pub fn run(self, w: Box<dyn IndexWrite>) -> Result<()> {
        (self.write)(w)
    }
}

impl fmt::Debug for DeferredWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredWrite").finish_non_exhaustive()
    }
}

/// A [`DeferredWrite`] bound to a result position.
#[derive(Debug)]
pub struct PendingWrite {
    pub index: u32,
    pub write: DeferredWrite,
}

/// One encoded piece of a result tuple.
#[derive(Debug)]
pub enum ResultPart {
    /// Bytes for the primary body.
    Inline(Bytes),
    /// Content delivered on sub-stream `index`.
    Deferred { index: u32, write: DeferredWrite },
}

/// Encoded result components in result-position order.
#[derive(Debug, Default)]
pub struct ResultSet {
    parts: Vec<ResultPart>,
    next_index: u32,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode the next result component.
    ///
    /// A component may contribute inline bytes, a deferred write, or both
    /// (an `option<stream>` writes its discriminant inline).
    pub fn push<T: Encode>(&mut self, value: T) -> Result<()> {
        let index = self.next_index;
        let mut buf = BytesMut::new();
        let deferred = value.encode(&mut buf)?;
        if !buf.is_empty() {
            self.parts.push(ResultPart::Inline(buf.freeze()));
        }
        if let Some(write) = deferred {
            debug!(index, "deferring result component");
            self.parts.push(ResultPart::Deferred { index, write });
        }
        self.next_index += 1;
        Ok(())
    }

    /// Number of result components pushed so far.
    pub fn len(&self) -> u32 {
        self.next_index
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    pub fn parts(&self) -> &[ResultPart] {
        &self.parts
    }

    /// Split into the primary body and the writes for indexed sub-streams.
    pub fn partition(self) -> (Bytes, Vec<PendingWrite>) {
        let mut body = BytesMut::new();
        let mut pending = Vec::new();
        for part in self.parts {
            match part {
                ResultPart::Inline(bytes) => body.extend_from_slice(&bytes),
                ResultPart::Deferred { index, write } => pending.push(PendingWrite { index, write }),
            }
        }
        (body.freeze(), pending)
    }
}

/// A byte stream result, delivered out of band.
///
/// Nothing is written to the primary body. The content is sent on the
/// result's sub-stream as length-prefixed chunks followed by an empty chunk.
pub struct ByteStream {
    reader: Box<dyn Read + Send>,
    chunk_size: usize,
}

impl ByteStream {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            chunk_size: DEFAULT_STREAM_CHUNK_SIZE,
        }
    }

    /// Set the maximum number of bytes per chunk. Zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl From<Bytes> for ByteStream {
    fn from(bytes: Bytes) -> Self {
        Self::new(std::io::Cursor::new(bytes))
    }
}

impl From<Vec<u8>> for ByteStream {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(std::io::Cursor::new(bytes))
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream")
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

impl Encode for ByteStream {
    fn encode(self, _dst: &mut BytesMut) -> Result<Option<DeferredWrite>> {
        let ByteStream {
            mut reader,
            chunk_size,
        } = self;
        Ok(Some(DeferredWrite::new(move |mut w| {
            let mut chunk = vec![0u8; chunk_size];
            let mut frame = BytesMut::new();
            let mut total = 0usize;
            loop {
                let n = match reader.read(&mut chunk) {
                    Ok(n) => n,
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err) => return Err(CodecError::io("failed to read stream source", err)),
                };
                frame.clear();
                write_uvarint(n as u64, &mut frame);
                frame.extend_from_slice(&chunk[..n]);
                w.write_all(&frame)
                    .map_err(|err| CodecError::io("failed to write stream chunk", err))?;
                if n == 0 {
                    break;
                }
                total += n;
                trace!(n, total, "wrote stream chunk");
            }
            w.flush()
                .map_err(|err| CodecError::io("failed to flush stream", err))?;
            debug!(total, "finished writing stream");
            Ok(())
        })))
    }
}

/// Read a chunked byte stream from its sub-stream until the empty chunk.
///
/// Each chunk is bounded by `config.max_string_len`, the accumulated total
/// by `config.max_list_len`.
pub fn read_byte_stream<R: Read + ?Sized>(r: &mut R, config: &CodecConfig) -> Result<Bytes> {
    let mut out = BytesMut::new();
    loop {
        let chunk = match Bytes::decode(r, config) {
            Ok(chunk) => chunk,
            Err(CodecError::Eof) => return Err(CodecError::UnexpectedEnd),
            Err(err) => return Err(err),
        };
        if chunk.is_empty() {
            return Ok(out.freeze());
        }
        let len = out.len() + chunk.len();
        if len > config.max_list_len {
            return Err(CodecError::LengthLimit {
                len,
                max: config.max_list_len,
            });
        }
        out.extend_from_slice(&chunk);
    }
}
