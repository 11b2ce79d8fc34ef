//! Daily check-in — what users talk to once onboarding is finished.
//!
//! The dispatcher only sees the [`DailyCheckIn`] trait. [`StaticCheckIn`]
//! answers with a fixed text; [`ProxyCheckIn`] forwards the message and the
//! user's profile to a text-generation proxy.

pub mod proxy;

use async_trait::async_trait;
use tracing::debug;

use crate::error::CheckInError;
use crate::onboarding::UserProfile;

pub use proxy::{ProxyCheckIn, ProxyConfig};

/// Reply used when no text-generation backend is configured.
pub const DEFAULT_STATIC_REPLY: &str = "IN LLM DAILY";

/// Handles messages from users who have completed onboarding.
#[async_trait]
pub trait DailyCheckIn: Send + Sync {
    /// Produce the reply for one check-in message.
    async fn check_in(&self, profile: &UserProfile, message: &str) -> Result<String, CheckInError>;
}

/// Answers every check-in with the same text.
#[derive(Debug, Clone)]
pub struct StaticCheckIn {
    reply: String,
}

impl StaticCheckIn {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl Default for StaticCheckIn {
    fn default() -> Self {
        Self::new(DEFAULT_STATIC_REPLY)
    }
}

#[async_trait]
impl DailyCheckIn for StaticCheckIn {
    async fn check_in(
        &self,
        profile: &UserProfile,
        message: &str,
    ) -> Result<String, CheckInError> {
        debug!(?profile, text = message, "Static daily check-in");
        Ok(self.reply.clone())
    }
}
