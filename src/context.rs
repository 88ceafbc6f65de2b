//! Execution context for context-aware rules
//!
//! A [`Context`] carries cancellation and an optional deadline through a
//! validation call. The engine only passes it along; rules that do expensive
//! work (lookups against a store, remote checks) consult it themselves,
//! usually through [`Context::check`].
//!
//! Clones share cancellation: cancelling any clone cancels them all.
//!
//! # Examples
//!
//! ```
//! use weir::Context;
//!
//! let ctx = Context::background();
//! let handle = ctx.clone();
//! assert!(ctx.check().is_ok());
//!
//! handle.cancel();
//! assert!(ctx.is_cancelled());
//! assert_eq!(ctx.check().unwrap_err().to_string(), "context canceled");
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, FaultKind, InternalError};

/// Cancellation and deadline signalling for one validation call.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Context {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context sharing this one's cancellation, with a deadline no later
    /// than `deadline`.
    pub fn child_with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Context {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some(deadline),
        }
    }

    /// Cancel this context and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Context::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the context is cancelled or past its deadline.
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// `Ok(())` while the context is live, otherwise a cancellation fault.
    pub fn check(&self) -> Result<(), Error> {
        if self.is_cancelled() {
            return Err(InternalError::with_kind(FaultKind::Cancelled, "context canceled").into());
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Err(InternalError::with_kind(
                FaultKind::DeadlineExceeded,
                "context deadline exceeded",
            )
            .into()),
            _ => Ok(()),
        }
    }
}
