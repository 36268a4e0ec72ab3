//! Logging context handed to the analyzer
//!
//! The binary builds a subscriber and wraps it here; the analyzer installs it
//! only for the duration of each analysis, so library code never touches the
//! global default.

use tracing::subscriber::NoSubscriber;
use tracing::Dispatch;

/// Explicit logging configuration for an analysis run
#[derive(Clone)]
pub struct LogContext {
    dispatch: Dispatch,
}

impl LogContext {
    /// Wrap an already configured dispatcher
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Discards every event
    pub fn silent() -> Self {
        Self::new(Dispatch::new(NoSubscriber::default()))
    }

    /// Run `f` with this context as the current dispatcher
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::silent()
    }
}

impl std::fmt::Debug for LogContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogContext").finish_non_exhaustive()
    }
}
