//! File-backed session store — every user's onboarding profile in one JSON
//! table.
//!
//! The table is read in full at the start of a request and written back in
//! full at the end. Writes replace the file; nothing is merged with what
//! another writer may have saved in between.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::onboarding::model::{UserProfile, session_id_for};

/// Default location of the session table.
pub const DEFAULT_SESSION_FILE: &str = "session_store.json";

/// In-memory snapshot of the session table plus the file it came from.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    profiles: BTreeMap<String, UserProfile>,
}

impl SessionStore {
    /// An empty store that will save to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            profiles: BTreeMap::new(),
        }
    }

    /// Read the whole table from `path`.
    ///
    /// Never fails: a missing or unreadable file, or one that is not a JSON
    /// object, gives an empty store. A single malformed entry (for example an
    /// unknown stage) is replaced by a fresh profile for that user.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let profiles = match fs::read_to_string(&path).await {
            Ok(content) => parse_table(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No session file yet, starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read session file, starting empty");
                BTreeMap::new()
            }
        };
        Self { path, profiles }
    }

    /// Overwrite the session file with the full in-memory table.
    ///
    /// The table is written to a sibling temp file first and renamed into
    /// place, so readers never see a partial table.
    pub async fn save(&self) -> Result<(), SessionError> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.profiles.serialize(&mut ser)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        let tmp = temp_path(&self.path);
        fs::write(&tmp, &buf).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), users = self.profiles.len(), "Sessions saved");
        Ok(())
    }

    /// Return the user's profile, creating a fresh one if absent.
    pub fn ensure_user(&mut self, user_id: &str) -> &mut UserProfile {
        self.ensure_user_created(user_id).0
    }

    /// Like [`ensure_user`](Self::ensure_user), also reporting whether the
    /// profile was created by this call.
    pub fn ensure_user_created(&mut self, user_id: &str) -> (&mut UserProfile, bool) {
        match self.profiles.entry(user_id.to_string()) {
            Entry::Occupied(entry) => (entry.into_mut(), false),
            Entry::Vacant(entry) => (entry.insert(UserProfile::new(user_id)), true),
        }
    }

    /// Replace the user's profile with a fresh one, discarding any progress.
    pub fn reset_user(&mut self, user_id: &str) -> &mut UserProfile {
        let fresh = UserProfile::new(user_id);
        match self.profiles.entry(user_id.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(fresh);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(fresh),
        }
    }

    pub fn get(&self, user_id: &str) -> Option<&UserProfile> {
        self.profiles.get(user_id)
    }

    pub fn profiles(&self) -> &BTreeMap<String, UserProfile> {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn parse_table(content: &str) -> BTreeMap<String, UserProfile> {
    let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(content) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Session file is corrupt, starting empty");
            return BTreeMap::new();
        }
    };

    raw.into_iter()
        .map(|(user, value)| {
            let profile = match serde_json::from_value::<UserProfile>(value) {
                Ok(mut profile) => {
                    if profile.session_id.is_empty() {
                        profile.session_id = session_id_for(&user);
                    }
                    profile
                }
                Err(e) => {
                    warn!(user = %user, error = %e, "Corrupt session entry, resetting profile");
                    UserProfile::new(&user)
                }
            };
            (user, profile)
        })
        .collect()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
