//! Health profile collected during onboarding.

use serde::{Deserialize, Deserializer, Serialize};

use super::state::Stage;

/// Body weight as the user reported it.
///
/// Numeric answers are kept as kilograms; anything else is stored verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Weight {
    Kilograms(f64),
    Unparsed(String),
}

impl Default for Weight {
    fn default() -> Self {
        Self::Kilograms(0.0)
    }
}

impl Weight {
    /// Interpret a chat answer such as `"72.5"`, `"80 kg"` or `"about 80"`.
    pub fn from_answer(answer: &str) -> Self {
        let trimmed = answer.trim();
        let lower = trimmed.to_lowercase();
        let number = lower
            .strip_suffix("kgs")
            .or_else(|| lower.strip_suffix("kg"))
            .unwrap_or(&lower)
            .trim();
        match number.parse::<f64>() {
            Ok(kg) if kg.is_finite() && kg >= 0.0 => Self::Kilograms(kg),
            _ => Self::Unparsed(trimmed.to_string()),
        }
    }
}

impl std::fmt::Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kilograms(kg) => write!(f, "{kg} kg"),
            Self::Unparsed(raw) => write!(f, "{raw}"),
        }
    }
}

/// Per-user onboarding progress and collected answers.
///
/// Field names on disk match the session file written by earlier versions of
/// the service, so existing stores keep loading.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub session_id: String,
    #[serde(rename = "onboarding_stage")]
    pub stage: Stage,
    pub condition: String,
    pub age: u32,
    pub weight: Weight,
    pub medications: Vec<String>,
    pub emergency_contact: String,
    #[serde(rename = "news_pref", deserialize_with = "string_or_list")]
    pub news_preference: Vec<String>,
}

impl UserProfile {
    /// A fresh profile at the first stage with every answer at its zero value.
    pub fn new(user_id: &str) -> Self {
        Self {
            session_id: session_id_for(user_id),
            ..Default::default()
        }
    }

    /// Whether onboarding has finished for this user.
    pub fn is_onboarded(&self) -> bool {
        self.stage.is_terminal()
    }

    /// Render the profile as a markdown section for a check-in system prompt.
    pub fn to_system_prompt_section(&self) -> String {
        let mut parts = vec!["# Health Profile".to_string()];

        if !self.condition.is_empty() {
            parts.push(format!("- **Condition:** {}", self.condition));
        }
        if self.age > 0 {
            parts.push(format!("- **Age:** {}", self.age));
        }
        if self.weight != Weight::default() {
            parts.push(format!("- **Weight:** {}", self.weight));
        }
        if !self.medications.is_empty() {
            parts.push(format!("- **Medications:** {}", self.medications.join(", ")));
        }
        if !self.emergency_contact.is_empty() {
            parts.push(format!("- **Emergency contact:** {}", self.emergency_contact));
        }
        if !self.news_preference.is_empty() {
            parts.push(format!(
                "- **Weekly updates:** {}",
                self.news_preference.join(", ")
            ));
        }

        parts.join("\n")
    }
}

/// Session id derived from the user identifier.
pub fn session_id_for(user_id: &str) -> String {
    format!("{user_id}-session")
}

/// Split a comma-separated answer into trimmed, non-empty items.
pub fn split_list(answer: &str) -> Vec<String> {
    answer
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Older session files stored a fresh user's news preference as `""`.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        List(Vec<String>),
        Text(String),
    }

    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::List(items) => items,
        StringOrList::Text(text) => split_list(&text),
    })
}
