//! Host-side renter rating workflow for a car-rental marketplace.
//!
//! The crate talks to the marketplace backend over HTTP and keeps the
//! session-local pieces (rating window policy, draft state, comment
//! sanitizing) free of I/O so the terminal dashboard and tests can drive them
//! directly.

pub mod api;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
