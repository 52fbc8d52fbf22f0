use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::{Buf, Bytes};
use tracing::{debug, info};

use crate::context::Context;
use crate::error::{Result, TransportError};
use crate::traits::{HandlerFn, IndexRead, IndexWrite, Invoke, Serve, Stop};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One stream in a capture tree: its bytes plus its indexed sub-streams.
#[derive(Default)]
struct Node {
    buf: Mutex<Vec<u8>>,
    children: Mutex<BTreeMap<u32, Arc<Node>>>,
}

impl Node {
    fn child(&self, index: u32) -> Option<Arc<Node>> {
        lock(&self.children).get(&index).cloned()
    }

    fn child_or_insert(&self, index: u32) -> Arc<Node> {
        Arc::clone(lock(&self.children).entry(index).or_default())
    }

    fn snapshot(&self) -> Bytes {
        Bytes::copy_from_slice(&lock(&self.buf))
    }
}

/// In-memory outgoing stream.
///
/// Clones share the same capture tree, so a test can keep one clone and
/// inspect what the other side wrote.
#[derive(Clone, Default)]
pub struct MemoryWriter {
    node: Arc<Node>,
}

impl MemoryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written to the primary stream so far.
    pub fn contents(&self) -> Bytes {
        self.node.snapshot()
    }

    /// The sub-stream at `index`, if anything indexed it.
    pub fn sub_stream(&self, index: u32) -> Option<MemoryWriter> {
        self.node.child(index).map(|node| MemoryWriter { node })
    }

    /// Indices of every sub-stream derived from this stream, ascending.
    pub fn indices(&self) -> Vec<u32> {
        lock(&self.node.children).keys().copied().collect()
    }

    /// A reader over a snapshot of everything captured so far.
    pub fn reader(&self) -> MemoryReader {
        MemoryReader {
            data: self.node.snapshot(),
            node: Some(Arc::clone(&self.node)),
        }
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        lock(&self.node.buf).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl IndexWrite for MemoryWriter {
    fn index(&self, index: u32) -> Result<Box<dyn IndexWrite>> {
        Ok(Box::new(MemoryWriter {
            node: self.node.child_or_insert(index),
        }))
    }
}

impl std::fmt::Debug for MemoryWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryWriter")
            .field("len", &lock(&self.node.buf).len())
            .field("indices", &self.indices())
            .finish()
    }
}

/// In-memory incoming stream.
#[derive(Debug)]
pub struct MemoryReader {
    data: Bytes,
    node: Option<Arc<Node>>,
}

impl MemoryReader {
    /// A reader over `data` with no sub-streams.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            node: None,
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &[u8] {
        self.data.as_ref()
    }
}

impl Read for MemoryReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.data.len().min(buf.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data.advance(n);
        Ok(n)
    }
}

impl IndexRead for MemoryReader {
    fn index(&self, index: u32) -> Result<Box<dyn IndexRead>> {
        let node = self
            .node
            .as_ref()
            .and_then(|node| node.child(index))
            .ok_or(TransportError::InvalidIndex(index))?;
        Ok(Box::new(MemoryReader {
            data: node.snapshot(),
            node: Some(node),
        }))
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("len", &lock(&self.buf).len())
            .finish_non_exhaustive()
    }
}

type Handlers = HashMap<(String, String), HandlerFn>;

/// In-process transport serving handlers from a registry.
///
/// [`Invoke::invoke`] runs the registered handler on the calling thread and
/// returns a reader over everything it wrote.
#[derive(Default)]
pub struct MemoryServer {
    handlers: Arc<Mutex<Handlers>>,
    closed: AtomicBool,
}

impl MemoryServer {
    /// Create a server with no registrations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered `(instance, name)` keys, sorted.
    pub fn served(&self) -> Vec<(String, String)> {
        let mut keys: Vec<_> = lock(&self.handlers).keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Drop every registration and refuse new ones.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        lock(&self.handlers).clear();
        info!("memory transport shut down");
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Shutdown);
        }
        Ok(())
    }
}

impl Serve for MemoryServer {
    fn serve(&self, instance: &str, name: &str, handler: HandlerFn) -> Result<Stop> {
        self.ensure_open()?;

        let key = (instance.to_string(), name.to_string());
        {
            let mut handlers = lock(&self.handlers);
            if handlers.contains_key(&key) {
                return Err(TransportError::AlreadyServing {
                    instance: key.0,
                    name: key.1,
                });
            }
            handlers.insert(key.clone(), handler);
        }
        info!(instance, name, "serving function");

        let handlers = Arc::clone(&self.handlers);
        Ok(Box::new(move || {
            let (instance, name) = key;
            match lock(&handlers).remove(&(instance.clone(), name.clone())) {
                Some(_) => {
                    debug!(%instance, %name, "stopped serving function");
                    Ok(())
                }
                None => Err(TransportError::NotServing { instance, name }),
            }
        }))
    }
}

impl Invoke for MemoryServer {
    fn invoke(
        &self,
        cx: &Context,
        instance: &str,
        name: &str,
        params: Bytes,
    ) -> Result<Box<dyn IndexRead>> {
        self.ensure_open()?;

        let handler = lock(&self.handlers)
            .get(&(instance.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| TransportError::NotServing {
                instance: instance.to_string(),
                name: name.to_string(),
            })?;

        debug!(instance, name, params = params.len(), "invoking function");
        let writer = MemoryWriter::new();
        handler(
            cx,
            Box::new(writer.clone()),
            Box::new(MemoryReader::new(params)),
        )
        .map_err(TransportError::Invocation)?;

        Ok(Box::new(writer.reader()))
    }
}

impl std::fmt::Debug for MemoryServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryServer")
            .field("served", &self.served())
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}
