//! Domain Layer - Core trade stream types and business logic.
//!
//! This layer contains the canonical trade event, the bounded history
//! buffer, the connection lifecycle state machine, and the summary
//! aggregator. All types here are pure Rust with serialization support
//! and no I/O.

/// Connection lifecycle state machine.
pub mod lifecycle;

/// Bounded rolling trade history.
pub mod history;

/// Derived summary statistics over the visible window.
pub mod summary;

/// Canonical trade event types.
pub mod trade;
