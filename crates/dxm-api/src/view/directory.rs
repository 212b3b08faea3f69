//! Directory view controller.
//!
//! Holds the view's [`FilterState`] and, once loaded, its records. The
//! record load is a one-shot background task started by [`mount`]; until it
//! lands the view renders an empty grid.
//!
//! [`mount`]: DirectoryController::mount

use std::future::Future;
use std::sync::Arc;

use dxm_core::{CompanyCollection, FilterState};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::lifecycle::ViewScope;

/// Point-in-time copy of a directory view.
#[derive(Debug, Clone)]
pub struct DirectorySnapshot {
    pub filter: FilterState,
    /// `None` while the initial load is in flight.
    pub records: Option<CompanyCollection>,
}

impl DirectorySnapshot {
    pub fn is_loaded(&self) -> bool {
        self.records.is_some()
    }

    /// Records to render; empty while loading.
    pub fn records_or_empty(&self) -> CompanyCollection {
        self.records.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryController {
    inner: Arc<Mutex<DirectorySnapshot>>,
}

impl DirectoryController {
    pub fn new(filter: FilterState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DirectorySnapshot {
                filter,
                records: None,
            })),
        }
    }

    /// Start the one-shot record load. The result is applied only if
    /// `scope` is still active when it arrives.
    pub fn mount<F>(&self, scope: &ViewScope, load: F) -> JoinHandle<bool>
    where
        F: Future<Output = CompanyCollection> + Send + 'static,
    {
        let guard = scope.guard();
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let records = load.await;
            guard.apply("records", move || {
                inner.lock().records = Some(records);
            })
        })
    }

    pub fn snapshot(&self) -> DirectorySnapshot {
        self.inner.lock().clone()
    }

    /// Mutate the filter state (every predicate setter resets the page).
    pub fn update<F: FnOnce(&mut FilterState)>(&self, f: F) {
        f(&mut self.inner.lock().filter);
    }
}
