//! Request dispatcher — load the session table, route the message, save.
//!
//! Every call reads the whole table from disk, lets either the onboarding
//! state machine or the daily check-in handle the message, and writes the
//! whole table back exactly once.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::checkin::DailyCheckIn;
use crate::error::DispatchError;
use crate::onboarding::{Outcome, advance};
use crate::store::SessionStore;

/// Sent when the check-in backend fails.
pub const CHECK_IN_UNAVAILABLE: &str =
    "Sorry, I couldn't reach the check-in service right now. Please try again in a moment.";

/// Which path handled a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The user asked to start over; the first question was sent.
    Restarted,
    /// The onboarding state machine handled the message.
    Onboarding(Outcome),
    /// The user is onboarded; the daily check-in replied.
    CheckIn,
}

/// Reply to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub route: Route,
}

/// Whether the message asks to restart onboarding.
pub fn is_restart(message: &str) -> bool {
    message.to_lowercase().contains("restart")
}

/// Routes messages between the session table, onboarding and check-in.
pub struct Dispatcher {
    session_path: PathBuf,
    check_in: Arc<dyn DailyCheckIn>,
    /// Serializes load → save cycles within this process. Other processes
    /// writing the same file are not excluded; the last save wins.
    cycle: Mutex<()>,
}

impl Dispatcher {
    pub fn new(session_path: impl Into<PathBuf>, check_in: Arc<dyn DailyCheckIn>) -> Self {
        Self {
            session_path: session_path.into(),
            check_in,
            cycle: Mutex::new(()),
        }
    }

    /// Handle one message from `user_id`.
    pub async fn handle(&self, message: &str, user_id: &str) -> Result<Reply, DispatchError> {
        let _cycle = self.cycle.lock().await;
        let message = message.trim();

        let mut store = SessionStore::load(&self.session_path).await;
        info!(user = user_id, known_users = store.len(), "Handling message");

        let reply = if is_restart(message) {
            let profile = store.reset_user(user_id);
            info!(user = user_id, "Onboarding restarted");
            Reply {
                text: advance(profile, "").prompt,
                route: Route::Restarted,
            }
        } else {
            let (profile, created) = store.ensure_user_created(user_id);
            if created {
                info!(user = user_id, "New user, starting onboarding");
            }
            if !profile.is_onboarded() {
                let step = advance(profile, message);
                Reply {
                    text: step.prompt,
                    route: Route::Onboarding(step.outcome),
                }
            } else {
                let text = match self.check_in.check_in(profile, message).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(user = user_id, error = %e, "Daily check-in failed");
                        CHECK_IN_UNAVAILABLE.to_string()
                    }
                };
                Reply {
                    text,
                    route: Route::CheckIn,
                }
            }
        };

        store.save().await?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::checkin::{DEFAULT_STATIC_REPLY, StaticCheckIn};
    use crate::error::CheckInError;
    use crate::onboarding::prompts::{self, question};
    use crate::onboarding::{Stage, UserProfile, Weight};
    use crate::store::DEFAULT_SESSION_FILE;

    struct FailingCheckIn;

    #[async_trait]
    impl DailyCheckIn for FailingCheckIn {
        async fn check_in(
            &self,
            _profile: &UserProfile,
            _message: &str,
        ) -> Result<String, CheckInError> {
            Err(CheckInError::Status {
                endpoint: "stub".to_string(),
                status: 500,
            })
        }
    }

    fn dispatcher(dir: &TempDir) -> Dispatcher {
        Dispatcher::new(
            dir.path().join(DEFAULT_SESSION_FILE),
            Arc::new(StaticCheckIn::default()),
        )
    }

    async fn stored(dir: &TempDir, user: &str) -> Option<UserProfile> {
        SessionStore::load(dir.path().join(DEFAULT_SESSION_FILE))
            .await
            .get(user)
            .cloned()
    }

    #[test]
    fn restart_is_case_insensitive_substring() {
        assert!(is_restart("restart"));
        assert!(is_restart("Please RESTART me"));
        assert!(is_restart("restarting"));
        assert!(!is_restart("start"));
    }

    #[tokio::test]
    async fn first_message_answers_condition() {
        let dir = TempDir::new().unwrap();
        let d = dispatcher(&dir);

        let reply = d.handle("hi", "alice").await.unwrap();
        assert_eq!(reply.text, question(Stage::Age));
        assert_eq!(
            reply.route,
            Route::Onboarding(Outcome::Advanced {
                from: Stage::Condition,
                to: Stage::Age
            })
        );

        let saved = stored(&dir, "alice").await.unwrap();
        assert_eq!(saved.stage, Stage::Age);
        assert_eq!(saved.condition, "hi");
        assert_eq!(saved.session_id, "alice-session");
    }

    #[tokio::test]
    async fn full_walkthrough_then_check_in() {
        let dir = TempDir::new().unwrap();
        let d = dispatcher(&dir);

        let steps = [
            ("Type II Diabetes", question(Stage::Age), Stage::Age),
            ("34", question(Stage::Weight), Stage::Weight),
            ("82", question(Stage::Medications), Stage::Medications),
            (
                "Metformin, Insulin",
                question(Stage::EmergencyContact),
                Stage::EmergencyContact,
            ),
            ("Kim 555-0123", question(Stage::NewsPref), Stage::NewsPref),
            ("Research News, TikTok", prompts::COMPLETION, Stage::Done),
        ];
        for (message, expected_reply, expected_stage) in steps {
            let reply = d.handle(message, "alice").await.unwrap();
            assert_eq!(reply.text, expected_reply, "reply to {message:?}");
            assert!(matches!(reply.route, Route::Onboarding(Outcome::Advanced { .. })));
            let saved = stored(&dir, "alice").await.unwrap();
            assert_eq!(saved.stage, expected_stage, "stage after {message:?}");
        }

        let profile = stored(&dir, "alice").await.unwrap();
        assert_eq!(profile.condition, "Type II Diabetes");
        assert_eq!(profile.age, 34);
        assert_eq!(profile.weight, Weight::Kilograms(82.0));
        assert_eq!(profile.medications, vec!["Metformin", "Insulin"]);
        assert_eq!(profile.emergency_contact, "Kim 555-0123");
        assert_eq!(profile.news_preference, vec!["Research News", "TikTok"]);

        // Seventh message goes to the daily check-in.
        let reply = d.handle("feeling good today", "alice").await.unwrap();
        assert_eq!(reply.route, Route::CheckIn);
        assert_eq!(reply.text, DEFAULT_STATIC_REPLY);
        assert_eq!(stored(&dir, "alice").await.unwrap(), profile);
    }

    #[tokio::test]
    async fn invalid_age_is_reprompted() {
        let dir = TempDir::new().unwrap();
        let d = dispatcher(&dir);
        d.handle("Crohn's disease", "bob").await.unwrap();

        let reply = d.handle("forty", "bob").await.unwrap();
        assert_eq!(reply.route, Route::Onboarding(Outcome::Rejected));
        assert_eq!(reply.text, prompts::age_correction());
        let saved = stored(&dir, "bob").await.unwrap();
        assert_eq!(saved.stage, Stage::Age);
        assert_eq!(saved.condition, "Crohn's disease");
        assert_eq!(saved.age, 0);
    }

    #[tokio::test]
    async fn restart_mid_onboarding_resets_profile() {
        let dir = TempDir::new().unwrap();
        let d = dispatcher(&dir);
        for message in ["Both", "29"] {
            d.handle(message, "carol").await.unwrap();
        }
        assert_eq!(stored(&dir, "carol").await.unwrap().stage, Stage::Weight);

        let reply = d.handle("Restart please", "carol").await.unwrap();
        assert_eq!(reply.route, Route::Restarted);
        assert_eq!(reply.text, question(Stage::Condition));
        assert_eq!(
            stored(&dir, "carol").await.unwrap(),
            UserProfile::new("carol")
        );

        // The next message answers the first question.
        d.handle("Type II Diabetes", "carol").await.unwrap();
        let saved = stored(&dir, "carol").await.unwrap();
        assert_eq!(saved.condition, "Type II Diabetes");
        assert_eq!(saved.stage, Stage::Age);
    }

    #[tokio::test]
    async fn restart_for_unknown_user_starts_onboarding() {
        let dir = TempDir::new().unwrap();
        let d = dispatcher(&dir);
        let reply = d.handle("restart", "dana").await.unwrap();
        assert_eq!(reply.text, question(Stage::Condition));
        assert!(stored(&dir, "dana").await.is_some());
    }

    #[tokio::test]
    async fn check_in_failure_still_saves() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_SESSION_FILE);
        let mut store = SessionStore::new(&path);
        store.ensure_user("erin").stage = Stage::Done;
        store.save().await.unwrap();

        let d = Dispatcher::new(&path, Arc::new(FailingCheckIn));
        let reply = d.handle("hello", "erin").await.unwrap();
        assert_eq!(reply.route, Route::CheckIn);
        assert_eq!(reply.text, CHECK_IN_UNAVAILABLE);

        let reply = d.handle("hello", "frank").await.unwrap();
        assert!(matches!(reply.route, Route::Onboarding(_)));
        assert!(stored(&dir, "erin").await.is_some());
        assert!(stored(&dir, "frank").await.is_some());
    }

    #[tokio::test]
    async fn concurrent_users_do_not_lose_writes() {
        let dir = TempDir::new().unwrap();
        let d = Arc::new(dispatcher(&dir));

        let mut handles = Vec::new();
        for i in 0..16 {
            let d = Arc::clone(&d);
            handles.push(tokio::spawn(async move {
                d.handle("hi", &format!("user{i}")).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let store = SessionStore::load(dir.path().join(DEFAULT_SESSION_FILE)).await;
        assert_eq!(store.len(), 16);
    }

    #[tokio::test]
    async fn unwritable_store_is_an_error() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the final rename fail.
        let path = dir.path().join("sessions.json");
        tokio::fs::create_dir_all(path.join("occupied")).await.unwrap();

        let d = Dispatcher::new(&path, Arc::new(StaticCheckIn::default()));
        let err = d.handle("hi", "gus").await.unwrap_err();
        assert!(matches!(err, DispatchError::Session(_)));
    }
}
