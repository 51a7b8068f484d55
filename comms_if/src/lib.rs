//! # Communications interface crate.
//!
//! Provides the wire formats shared between the arm executable and its
//! operators, along with the networking helpers used to carry them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telecommands sent to the arm executable and the responses it returns
pub mod tc;

/// Telemetry structures produced by equipment (like the arm)
pub mod eqpt;

/// Network module
pub mod net;
