//! Onboarding state machine — one stage per incoming message.
//!
//! Each call records the message as the answer to the current stage, moves
//! to the next stage and returns that stage's question. Answers are checked
//! by [`validate`] first; a rejected answer changes nothing.

use tracing::debug;

use super::model::{UserProfile, Weight, split_list};
use super::prompts;
use super::state::Stage;

/// A validated answer, ready to be written into the profile.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Condition(String),
    Age(u32),
    Weight(Weight),
    Medications(Vec<String>),
    EmergencyContact(String),
    NewsPref(Vec<String>),
}

impl Answer {
    /// Write the answer into its profile field.
    fn apply(self, profile: &mut UserProfile) {
        match self {
            Self::Condition(condition) => profile.condition = condition,
            Self::Age(age) => profile.age = age,
            Self::Weight(weight) => profile.weight = weight,
            Self::Medications(medications) => profile.medications = medications,
            Self::EmergencyContact(contact) => profile.emergency_contact = contact,
            Self::NewsPref(prefs) => profile.news_preference = prefs,
        }
    }
}

/// An answer that was not accepted, with the text to send back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub message: String,
}

impl Rejection {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Check `message` as an answer for `stage`.
///
/// Only the age is validated. A blank message at the first stage is not an
/// answer; the condition question is sent instead.
pub fn validate(stage: Stage, message: &str) -> Result<Answer, Rejection> {
    let text = message.trim();

    match stage {
        Stage::Condition if text.is_empty() => {
            Err(Rejection::new(prompts::question(Stage::Condition)))
        }
        Stage::Condition => Ok(Answer::Condition(text.to_string())),
        Stage::Age => text
            .parse::<u32>()
            .map(Answer::Age)
            .map_err(|_| Rejection::new(prompts::age_correction())),
        Stage::Weight => Ok(Answer::Weight(Weight::from_answer(text))),
        Stage::Medications => Ok(Answer::Medications(split_list(text))),
        Stage::EmergencyContact => Ok(Answer::EmergencyContact(text.to_string())),
        Stage::NewsPref => Ok(Answer::NewsPref(split_list(text))),
        Stage::Done => Err(Rejection::new(prompts::COMPLETION)),
    }
}

/// What a call to [`advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The answer was recorded and the stage moved forward.
    Advanced { from: Stage, to: Stage },
    /// The answer was rejected; the profile is unchanged.
    Rejected,
    /// The profile had already finished onboarding; nothing changed.
    AlreadyDone,
}

/// Result of one state-machine step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// Text to send back to the user.
    pub prompt: String,
    /// Whether the profile is at the terminal stage after this step.
    pub done: bool,
    pub outcome: Outcome,
}

/// Advance `profile` by one stage using `message` as the current answer.
///
/// On success exactly one field is written and the stage moves forward; on
/// rejection neither happens. Profiles at [`Stage::Done`] belong to the daily
/// check-in and are left untouched.
pub fn advance(profile: &mut UserProfile, message: &str) -> Advance {
    let from = profile.stage;
    let Some(to) = from.next() else {
        return Advance {
            prompt: prompts::COMPLETION.to_string(),
            done: true,
            outcome: Outcome::AlreadyDone,
        };
    };

    match validate(from, message) {
        Ok(answer) => {
            answer.apply(profile);
            profile.stage = to;
            debug!(session = %profile.session_id, %from, %to, "Onboarding stage advanced");
            Advance {
                prompt: prompts::question(to).to_string(),
                done: to.is_terminal(),
                outcome: Outcome::Advanced { from, to },
            }
        }
        Err(rejection) => {
            debug!(session = %profile.session_id, stage = %from, "Onboarding answer rejected");
            Advance {
                prompt: rejection.message,
                done: false,
                outcome: Outcome::Rejected,
            }
        }
    }
}
