//! Persistence layer — the per-user session table.

pub mod sessions;

pub use sessions::{DEFAULT_SESSION_FILE, SessionStore};
