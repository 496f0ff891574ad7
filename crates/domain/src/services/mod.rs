//! Shared service helpers such as session caching and telemetry wiring.

pub mod session;
pub mod telemetry;

pub use session::*;
pub use telemetry::*;
