//! # Route Modules
//!
//! Each module defines an Axum Router for one surface area. Routers are
//! merged in [`crate::app`].

pub mod directory;
pub mod leads;
pub mod pages;
