//! User-facing onboarding questions.

use super::state::Stage;

/// Sent when the last question has been answered.
pub const COMPLETION: &str =
    "✅ Onboarding complete! You're all set. You can now do daily check-ins or request help anytime.";

/// Prefix for a rejected age answer.
pub const AGE_CORRECTION: &str = "Please enter your age as a whole number (for example: 34).";

/// The question asked while the user is at `stage`.
pub fn question(stage: Stage) -> &'static str {
    match stage {
        Stage::Condition => {
            "🩺 What condition do you have? (Type II Diabetes, Crohn’s disease, or both)"
        }
        Stage::Age => "🎂 How old are you?",
        Stage::Weight => "⚖️ What's your weight (in kg)?",
        Stage::Medications => {
            "💊 What medications are you currently taking? (separate them with commas)"
        }
        Stage::EmergencyContact => {
            "📞 Who should we contact in case of emergency? (Name + Phone)"
        }
        Stage::NewsPref => {
            "📰 What kind of weekly health updates would you like?\nOptions: Instagram Reel 📱, TikTok 🎵, or Research News 🧪"
        }
        Stage::Done => COMPLETION,
    }
}

/// Correction shown for an unusable age answer, followed by the question again.
pub fn age_correction() -> String {
    format!("{AGE_CORRECTION}\n{}", question(Stage::Age))
}
