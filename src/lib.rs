//! Health Onboard — conversational onboarding for a health-tracking assistant.

pub mod api;
pub mod checkin;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod onboarding;
pub mod store;
