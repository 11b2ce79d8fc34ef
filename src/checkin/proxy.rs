//! Check-in backed by a text-generation proxy over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::DailyCheckIn;
use crate::error::CheckInError;
use crate::onboarding::UserProfile;

/// Connection settings for the text-generation proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Full URL the generate request is POSTed to.
    pub endpoint: String,
    pub api_key: SecretString,
    pub model: String,
    pub temperature: f32,
    /// How many earlier turns of the session the proxy should include.
    pub lastk: u32,
    pub timeout: Duration,
}

impl ProxyConfig {
    pub fn new(endpoint: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            model: "4o-mini".to_string(),
            temperature: 0.7,
            lastk: 5,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    action: &'static str,
    model: &'a str,
    system: &'a str,
    query: &'a str,
    temperature: f32,
    lastk: u32,
    session_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    result: String,
}

/// Sends check-in messages to the proxy with the user's health profile as
/// the system prompt.
pub struct ProxyCheckIn {
    client: reqwest::Client,
    config: ProxyConfig,
}

impl ProxyCheckIn {
    pub fn new(config: ProxyConfig) -> Result<Self, CheckInError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CheckInError::Request {
                endpoint: config.endpoint.clone(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        info!(endpoint = %config.endpoint, model = %config.model, "Using text-generation proxy for check-ins");
        Ok(Self { client, config })
    }

    /// System prompt for a check-in with this user.
    pub fn system_prompt(profile: &UserProfile) -> String {
        let today = Local::now().format("%A, %B %-d, %Y");
        format!(
            "You are a supportive health assistant running a short daily check-in.\n\
             Today is {today}.\n\
             Ask how the user is feeling, relate your questions to their condition and \
             medications, and keep replies to 2-4 sentences. Never give a diagnosis; \
             suggest contacting a clinician or their emergency contact if something sounds urgent.\n\n\
             {}",
            profile.to_system_prompt_section()
        )
    }
}

#[async_trait]
impl DailyCheckIn for ProxyCheckIn {
    async fn check_in(
        &self,
        profile: &UserProfile,
        message: &str,
    ) -> Result<String, CheckInError> {
        let endpoint = &self.config.endpoint;
        let system = Self::system_prompt(profile);
        let body = GenerateRequest {
            action: "chat",
            model: &self.config.model,
            system: &system,
            query: message,
            temperature: self.config.temperature,
            lastk: self.config.lastk,
            session_id: &profile.session_id,
        };

        let response = self
            .client
            .post(endpoint)
            .header("x-api-key", self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| CheckInError::Request {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%endpoint, status = status.as_u16(), "Check-in proxy returned an error status");
            return Err(CheckInError::Status {
                endpoint: endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let parsed: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| CheckInError::InvalidResponse {
                    endpoint: endpoint.clone(),
                    reason: e.to_string(),
                })?;
        Ok(parsed.result)
    }
}
