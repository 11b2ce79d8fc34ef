//! Onboarding stages — which question the user is answering.

use serde::{Deserialize, Serialize};

/// The stages of the onboarding conversation.
///
/// Progresses linearly: Condition → Age → Weight → Medications →
/// EmergencyContact → NewsPref → Done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Condition,
    Age,
    Weight,
    Medications,
    EmergencyContact,
    NewsPref,
    Done,
}

impl Stage {
    /// All stages in onboarding order.
    pub const ALL: [Stage; 7] = [
        Stage::Condition,
        Stage::Age,
        Stage::Weight,
        Stage::Medications,
        Stage::EmergencyContact,
        Stage::NewsPref,
        Stage::Done,
    ];

    /// Whether onboarding is finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The stage that follows this one, if any.
    pub fn next(&self) -> Option<Stage> {
        use Stage::*;
        match self {
            Condition => Some(Age),
            Age => Some(Weight),
            Weight => Some(Medications),
            Medications => Some(EmergencyContact),
            EmergencyContact => Some(NewsPref),
            NewsPref => Some(Done),
            Done => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Condition => "condition",
            Self::Age => "age",
            Self::Weight => "weight",
            Self::Medications => "medications",
            Self::EmergencyContact => "emergency_contact",
            Self::NewsPref => "news_pref",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}
