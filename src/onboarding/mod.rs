//! Onboarding — the fixed question sequence a new user walks through.
//!
//! The conversation collects one health-profile field per message. Once the
//! last question is answered the profile is handed to the daily check-in.

pub mod machine;
pub mod model;
pub mod prompts;
pub mod state;

pub use machine::{Advance, Answer, Outcome, Rejection, advance, validate};
pub use model::{UserProfile, Weight};
pub use state::Stage;
