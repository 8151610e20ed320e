//! Outbound notification channels.
//!
//! Channel names appear in dispatch summaries and log events; they must
//! stay in sync with the gateway implementations in the notify crate.

/// Push notification delivered to a registered device token.
pub const CHANNEL_PUSH: &str = "push";

/// Templated, business-initiated message delivered to a phone number.
pub const CHANNEL_MESSAGING: &str = "messaging";

/// The outbound channel a dispatch summary belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Push,
    Messaging,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => CHANNEL_PUSH,
            Self::Messaging => CHANNEL_MESSAGING,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
