//! Outbound delivery gateways.
//!
//! This module provides the push and messaging channel clients used by
//! the fan-out coordinator to reach students outside the platform. Each
//! gateway is behind a trait so the coordinator can be exercised without
//! network access.

pub mod messaging;
pub mod push;
