//! User profile cache.
//!
//! The profile is display data, not a credential: it lets the UI redraw
//! optimistically after a reload while the next verify call is in flight.
//! Only the session manager writes it.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// The last known user, as returned by login/refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
}

impl UserProfile {
    /// Name to show in a header widget: full name when present, else email.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.email.clone(),
        }
    }
}

/// Tab-scoped store for the last known profile.
pub trait ProfileCache: Send + Sync {
    fn load(&self) -> Option<UserProfile>;
    fn store(&self, profile: &UserProfile);
    fn clear(&self);
}

/// In-memory profile cache (the lifetime of one client instance).
#[derive(Debug, Default)]
pub struct MemoryProfileCache {
    profile: Mutex<Option<UserProfile>>,
}

impl MemoryProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache pre-populated with a profile, as after a page reload.
    pub fn with_profile(profile: UserProfile) -> Self {
        Self {
            profile: Mutex::new(Some(profile)),
        }
    }
}

impl ProfileCache for MemoryProfileCache {
    fn load(&self) -> Option<UserProfile> {
        self.profile.lock().unwrap().clone()
    }

    fn store(&self, profile: &UserProfile) {
        *self.profile.lock().unwrap() = Some(profile.clone());
    }

    fn clear(&self) {
        *self.profile.lock().unwrap() = None;
    }
}
