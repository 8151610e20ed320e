//! Placement drive event bus and notification fan-out.
//!
//! This crate provides everything between a drive write and the
//! notifications it produces:
//!
//! - [`DriveEventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DriveEvent`] — the drive created/updated envelope.
//! - [`EligibilityEvaluator`] — resolves a drive's criteria to the
//!   students it applies to.
//! - [`gateway`] — outbound delivery channels (push, messaging).
//! - [`FanoutCoordinator`] — background service that turns each event
//!   into per-channel deliveries.
//! - [`DeadlineSweep`] — periodic task that closes expired drives.

pub mod bus;
pub mod eligibility;
pub mod fanout;
pub mod gateway;
pub mod lifecycle;

pub use bus::{DriveEvent, DriveEventBus};
pub use eligibility::EligibilityEvaluator;
pub use fanout::{FanoutConfig, FanoutCoordinator};
pub use gateway::messaging::{MessagingConfig, MessagingGateway, WhatsAppGateway};
pub use gateway::push::{FcmGateway, PushConfig, PushGateway};
pub use lifecycle::{transition_drive, DeadlineSweep};
