//! Simulated live collaboration for the genealogy dashboard.
//!
//! ARCHITECTURE
//! ============
//! A `CollabSession` holds the current user, the roster of active users, the
//! chat log and the tree-update log. Every outbound action is staged as a
//! frame on an in-process mock socket; the echo simulator applies it to the
//! logs after an artificial delay, as if it had come back from a server.
//! There is no transport, no persistence and no second real participant.

pub mod config;
pub mod frame;
pub mod genealogy;
pub mod sample;
pub mod services;
pub mod socket;
pub mod state;

pub use config::{ConfigError, SessionConfig};
pub use services::session::CollabSession;
