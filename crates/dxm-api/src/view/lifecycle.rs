//! # View Lifecycle
//!
//! A view (one page render, one form submission) owns a [`ViewScope`].
//! Background work spawned on behalf of the view carries an [`ActiveGuard`]
//! and must check it before applying a result: once the scope is torn down
//! or dropped, every guard reports inactive and late results are discarded.
//!
//! In the server this is what happens when a client disconnects mid-request:
//! axum drops the handler future, the scope goes with it, and the spawned
//! load or delivery finishes without touching state nobody will read.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Owner side of a view's lifetime.
#[derive(Debug)]
pub struct ViewScope {
    alive: Arc<AtomicBool>,
    name: &'static str,
}

impl ViewScope {
    pub fn new(name: &'static str) -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
            name,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// A guard for work started now.
    pub fn guard(&self) -> ActiveGuard {
        ActiveGuard {
            alive: Arc::clone(&self.alive),
            view: self.name,
        }
    }

    pub fn is_active(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Explicit teardown. Dropping the scope has the same effect.
    pub fn teardown(&self) {
        if self.alive.swap(false, Ordering::AcqRel) {
            tracing::debug!(view = self.name, "view torn down");
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Worker side of a view's lifetime. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ActiveGuard {
    alive: Arc<AtomicBool>,
    view: &'static str,
}

impl ActiveGuard {
    pub fn is_active(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Run `apply` only while the view is still active. Returns whether it ran.
    pub fn apply<F: FnOnce()>(&self, what: &'static str, apply: F) -> bool {
        if self.is_active() {
            apply();
            true
        } else {
            tracing::debug!(view = self.view, result = what, "discarding result for torn-down view");
            false
        }
    }
}
