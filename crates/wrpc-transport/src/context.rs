use tokio_util::sync::CancellationToken;

/// Per-invocation context handed to handlers.
///
/// Cancellation is the only signal carried. Handlers and long-running
/// writers poll [`Context::is_cancelled`] and unwind on their own; nothing
/// in this workspace enforces a deadline.
#[derive(Clone, Debug, Default)]
pub struct Context {
    token: CancellationToken,
}

impl Context {
    /// Create a fresh, uncancelled context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing cancellation token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Derive a context that is cancelled together with this one.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Cancel this context and every child derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The underlying cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}
