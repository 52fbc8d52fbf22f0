//! Serving a whole interface and tearing it down again.

use std::fmt;

use tracing::{debug, info, warn};
use wrpc_codec::CodecConfig;
use wrpc_transport::{Context, Serve, Stop};

use crate::dispatch::{serve_function, DecodeParams, EncodeResults, HandlerResult};
use crate::error::ServeError;

/// Configuration applied to every function served through a [`ServeSet`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeConfig {
    /// Decoding limits for parameters.
    pub codec: CodecConfig,
}

/// Composite stop for a set of registrations.
///
/// [`StopHandle::stop`] runs each stop in registration order and returns the
/// first error without running the rest.
#[derive(Default)]
pub struct StopHandle {
    stops: Vec<(String, Stop)>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the stop for `function`.
    pub fn push(&mut self, function: impl Into<String>, stop: Stop) {
        self.stops.push((function.into(), stop));
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Functions covered by this handle, in registration order.
    pub fn functions(&self) -> impl Iterator<Item = &str> {
        self.stops.iter().map(|(function, _)| function.as_str())
    }

    pub fn stop(self) -> wrpc_transport::Result<()> {
        for (function, stop) in self.stops {
            debug!(function = %function, "stopping");
            if let Err(err) = stop() {
                warn!(function = %function, error = %err, "failed to stop");
                return Err(err);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopHandle")
            .field("functions", &self.functions().collect::<Vec<_>>())
            .finish()
    }
}

/// Registers the functions of one interface instance.
///
/// ```no_run
/// # use wrpc_runtime::{ServeConfig, ServeSet};
/// # use wrpc_transport::MemoryServer;
/// let server = MemoryServer::new();
/// let stop = ServeSet::new(&server, "test:greet/api", ServeConfig::default())
///     .serve("hello", |_cx, (name,): (String,)| Ok((format!("hello {name}"),)))?
///     .finish();
/// stop.stop()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ServeSet<'a, S: Serve + ?Sized> {
    server: &'a S,
    instance: String,
    config: ServeConfig,
    registered: StopHandle,
}

impl<'a, S: Serve + ?Sized> ServeSet<'a, S> {
    pub fn new(server: &'a S, instance: impl Into<String>, config: ServeConfig) -> Self {
        Self {
            server,
            instance: instance.into(),
            config,
            registered: StopHandle::new(),
        }
    }

    /// Register `f` as function `name`.
    ///
    /// On failure the stops for everything registered so far are handed back
    /// in [`ServeError::registered`].
    pub fn serve<P, T, F>(mut self, name: &str, f: F) -> Result<Self, ServeError>
    where
        P: DecodeParams + 'static,
        T: EncodeResults + 'static,
        F: Fn(&Context, P) -> HandlerResult<T> + Send + Sync + 'static,
    {
        let function = format!("{}.{name}", self.instance);
        match serve_function(self.server, &self.instance, name, self.config.codec, f) {
            Ok(stop) => {
                debug!(function = %function, "serving");
                self.registered.push(function, stop);
                Ok(self)
            }
            Err(source) => Err(ServeError {
                function,
                source,
                registered: self.registered,
            }),
        }
    }

    /// Finish registration and return the composite stop.
    pub fn finish(self) -> StopHandle {
        info!(
            instance = %self.instance,
            functions = self.registered.len(),
            "serving interface"
        );
        self.registered
    }
}

impl<S: Serve + ?Sized> fmt::Debug for ServeSet<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServeSet")
            .field("instance", &self.instance)
            .field("config", &self.config)
            .field("registered", &self.registered)
            .finish()
    }
}
