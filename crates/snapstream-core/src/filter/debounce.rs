//! Coalesces rapid filter triggers so only the last one is evaluated.

use std::time::Duration;
use tokio::task::AbortHandle;

use crate::config::FilterConfig;

/// Aborts the wrapped task when dropped.
struct AbortTaskOnDrop(AbortHandle);

impl Drop for AbortTaskOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Each `schedule` supersedes the pending job; a job runs only after the
/// quiescence window elapses with no newer trigger. Dropping the debouncer
/// cancels whatever is pending.
///
/// Must be used from inside a tokio runtime.
pub struct FilterDebouncer {
    window: Duration,
    pending: Option<AbortTaskOnDrop>,
}

impl FilterDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn from_config(cfg: &FilterConfig) -> Self {
        Self::new(Duration::from_millis(cfg.debounce_ms))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn schedule<F>(&mut self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let window = self.window;
        let task = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            job();
        });
        // Replacing the guard aborts the superseded task.
        self.pending = Some(AbortTaskOnDrop(task.abort_handle()));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// True while a scheduled job has neither run nor been cancelled.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.0.is_finished())
    }
}
