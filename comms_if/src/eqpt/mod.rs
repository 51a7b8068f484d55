//! # Equipment Interface
//!
//! This module defines the telemetry structures which are published by equipment servers.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod arm;
