//! # Submission Ledger
//!
//! Every rendered lead form carries a one-time submission token in a hidden
//! field. The ledger remembers the tokens it has seen so that a double
//! click, or a resend after the browser's back button, relays the lead only
//! once. The second request gets the in-flight or recorded view instead.
//!
//! The ledger is bounded: once full, the oldest tokens are forgotten first.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use dxm_core::LeadFormMachine;
use parking_lot::Mutex;
use uuid::Uuid;

/// Hidden form field holding the token.
pub const TOKEN_FIELD: &str = "submission_token";

/// Tokens remembered before the oldest are evicted.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Result of presenting a token.
#[derive(Debug, Clone)]
pub enum Claim {
    /// First use. The caller owns the submission.
    Fresh,
    /// Another request with this token is still delivering.
    InFlight,
    /// Another request with this token finished with this view.
    Completed(LeadFormMachine),
}

#[derive(Debug)]
struct Ledger {
    entries: HashMap<Uuid, Option<LeadFormMachine>>,
    order: VecDeque<Uuid>,
    capacity: usize,
}

/// Bounded record of used submission tokens. Clones share the ledger.
#[derive(Debug, Clone)]
pub struct SubmissionLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl Default for SubmissionLedger {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl SubmissionLedger {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Ledger {
                entries: HashMap::new(),
                order: VecDeque::new(),
                capacity: capacity.max(1),
            })),
        }
    }

    /// A new token for a form about to be rendered.
    pub fn issue() -> String {
        Uuid::new_v4().to_string()
    }

    /// Parse a submitted token. Anything but a UUID is treated as absent.
    pub fn parse(raw: &str) -> Option<Uuid> {
        Uuid::parse_str(raw.trim()).ok()
    }

    /// Present `token`. The first caller gets [`Claim::Fresh`].
    pub fn claim(&self, token: Uuid) -> Claim {
        let mut ledger = self.inner.lock();
        if let Some(entry) = ledger.entries.get(&token) {
            return match entry {
                None => Claim::InFlight,
                Some(snapshot) => Claim::Completed(snapshot.clone()),
            };
        }
        while ledger.order.len() >= ledger.capacity {
            if let Some(oldest) = ledger.order.pop_front() {
                ledger.entries.remove(&oldest);
            }
        }
        ledger.entries.insert(token, None);
        ledger.order.push_back(token);
        Claim::Fresh
    }

    /// Record the view a finished submission produced.
    pub fn complete(&self, token: Uuid, snapshot: LeadFormMachine) {
        let mut ledger = self.inner.lock();
        if let Some(entry) = ledger.entries.get_mut(&token) {
            *entry = Some(snapshot);
        }
    }

    /// Forget `token` so it can be presented again.
    pub fn release(&self, token: Uuid) {
        let mut ledger = self.inner.lock();
        if ledger.entries.remove(&token).is_some() {
            ledger.order.retain(|t| *t != token);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
