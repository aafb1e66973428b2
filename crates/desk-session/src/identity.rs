//! Impersonation identity stack.
//!
//! A two-slot stack: the live identity lives in the profile cache, and at
//! most one original identity is stashed here while an administrator is
//! impersonating another user. Starting a second impersonation keeps the
//! original stash, so "stop impersonating" always restores the real admin.

use crate::UserProfile;

/// Saved-identity slot for impersonation.
#[derive(Debug, Default)]
pub struct IdentityStack {
    saved: Option<UserProfile>,
}

impl IdentityStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stash the given identity unless one is already saved.
    ///
    /// Returns true if the identity was stashed.
    pub fn stash_if_empty(&mut self, profile: UserProfile) -> bool {
        if self.saved.is_some() {
            return false;
        }
        self.saved = Some(profile);
        true
    }

    /// Take the saved identity, clearing the slot.
    pub fn pop(&mut self) -> Option<UserProfile> {
        self.saved.take()
    }

    /// Whether an identity is currently stashed (i.e. impersonation active).
    pub fn is_impersonating(&self) -> bool {
        self.saved.is_some()
    }

    /// The saved identity, if any.
    pub fn saved(&self) -> Option<&UserProfile> {
        self.saved.as_ref()
    }

    /// Drop any saved identity (logout discards both identities).
    pub fn clear(&mut self) {
        self.saved = None;
    }
}
