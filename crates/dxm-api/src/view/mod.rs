//! # Server-Rendered Views
//!
//! - [`lifecycle`]: view scopes and the guards background work checks
//!   before touching view state.
//! - [`directory`]: directory view controller (filter state and the
//!   one-shot record load).
//! - [`form`]: lead form controller driving the submission state machine.
//! - [`submission`]: one-time submission tokens that keep a form post
//!   from being relayed twice.
//! - [`render`]: HTML for every page.

pub mod directory;
pub mod form;
pub mod lifecycle;
pub mod render;
pub mod submission;
