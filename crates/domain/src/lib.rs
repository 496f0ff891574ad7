//! Domain-level building blocks shared across the API and feed crates.
//!
//! Identifiers, show/message records, pricing and moderation rules live in
//! [`model`]; storage traits implemented by `hearme_storage` live in
//! [`storage`]; process-wide helpers (telemetry, sessions) live in
//! [`services`].

pub mod config;
pub mod model;
pub mod services;
pub mod storage;

pub use model::*;
pub use storage::*;
