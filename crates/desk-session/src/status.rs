//! Session status state machine using rust-fsm.
//!
//! Status transitions are explicit rather than derived from cache checks.
//!
//! ## State Diagram
//!
//! ```text
//! ┌─────────────┐ CachedProfileFound ┌─────────────┐
//! │   Unknown   │ ──────────────────►│    Ready    │◄─── LoginSucceeded,
//! └──────┬──────┘                    └──────┬──────┘     VerifyPassed,
//!        │ NoCredential                     │            RefreshSucceeded
//!        ▼                                  │ VerifyFailed / RefreshFailed
//! ┌─────────────┐                           ▼            / LogoutCompleted
//! │   Missing   │◄──────────────────────────┘
//! └──────┬──────┘
//!        │ LoginAttempt (from any settled state)
//!        ▼
//! ┌─────────────┐ LoginFailed  ┌─────────────┐
//! │   Loading   │ ────────────►│    Error    │
//! └─────────────┘              └─────────────┘
//! ```

use rust_fsm::*;
use serde::{Deserialize, Serialize};

// Generates a module `session_machine` with State, Input, and StateMachine
// types for the transitions below.
state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(Unknown)

    Unknown => {
        CachedProfileFound => Ready,
        NoCredential => Missing,
        LoginAttempt => Loading,
        VerifyPassed => Ready,
        VerifyFailed => Missing,
        RefreshSucceeded => Ready,
        RefreshFailed => Missing,
        LogoutCompleted => Missing
    },
    Missing => {
        LoginAttempt => Loading,
        VerifyPassed => Ready,
        VerifyFailed => Missing,
        RefreshSucceeded => Ready,
        RefreshFailed => Missing,
        LogoutCompleted => Missing
    },
    Loading => {
        LoginSucceeded => Ready,
        LoginFailed => Error,
        LogoutCompleted => Missing
    },
    Ready => {
        LoginAttempt => Loading,
        VerifyPassed => Ready,
        VerifyFailed => Missing,
        RefreshSucceeded => Ready,
        RefreshFailed => Missing,
        LogoutCompleted => Missing
    },
    Error => {
        LoginAttempt => Loading,
        VerifyPassed => Ready,
        VerifyFailed => Missing,
        RefreshSucceeded => Ready,
        RefreshFailed => Missing,
        LogoutCompleted => Missing
    }
}

/// Session status for external consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Initial state, before the first credential check.
    Unknown,
    /// No credential is known.
    Missing,
    /// A login is in flight.
    Loading,
    /// Credential verified, profile loaded.
    Ready,
    /// The last login attempt failed.
    Error,
}

impl SessionStatus {
    /// Returns true only when a verified session exists.
    ///
    /// Authenticated screens must treat anything else as "not authenticated".
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionStatus::Ready)
    }

    /// Returns true while the status is still being determined.
    pub fn is_transient(&self) -> bool {
        matches!(self, SessionStatus::Unknown | SessionStatus::Loading)
    }
}

impl From<&session_machine::State> for SessionStatus {
    fn from(state: &session_machine::State) -> Self {
        match state {
            session_machine::State::Unknown => SessionStatus::Unknown,
            session_machine::State::Missing => SessionStatus::Missing,
            session_machine::State::Loading => SessionStatus::Loading,
            session_machine::State::Ready => SessionStatus::Ready,
            session_machine::State::Error => SessionStatus::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::session_machine::{Input, State, StateMachine};
    use super::*;

    #[test]
    fn initial_state_is_unknown() {
        let machine = StateMachine::new();
        assert_eq!(*machine.state(), State::Unknown);
    }

    #[test]
    fn login_flow() {
        let mut machine = StateMachine::new();

        machine.consume(&Input::LoginAttempt).unwrap();
        assert_eq!(*machine.state(), State::Loading);

        machine.consume(&Input::LoginSucceeded).unwrap();
        assert_eq!(*machine.state(), State::Ready);
    }

    #[test]
    fn failed_login_lands_in_error_and_can_retry() {
        let mut machine = StateMachine::new();

        machine.consume(&Input::LoginAttempt).unwrap();
        machine.consume(&Input::LoginFailed).unwrap();
        assert_eq!(*machine.state(), State::Error);

        machine.consume(&Input::LoginAttempt).unwrap();
        assert_eq!(*machine.state(), State::Loading);
        machine.consume(&Input::LoginSucceeded).unwrap();
        assert_eq!(*machine.state(), State::Ready);
    }

    #[test]
    fn cached_profile_gives_optimistic_ready() {
        let mut machine = StateMachine::new();

        machine.consume(&Input::CachedProfileFound).unwrap();
        assert_eq!(*machine.state(), State::Ready);

        // Verification later demotes when the server rejects.
        machine.consume(&Input::VerifyFailed).unwrap();
        assert_eq!(*machine.state(), State::Missing);
    }

    #[test]
    fn logout_always_lands_in_missing() {
        for inputs in [
            vec![],
            vec![Input::NoCredential],
            vec![Input::LoginAttempt],
            vec![Input::LoginAttempt, Input::LoginSucceeded],
            vec![Input::LoginAttempt, Input::LoginFailed],
        ] {
            let mut machine = StateMachine::new();
            for input in &inputs {
                machine.consume(input).unwrap();
            }
            machine.consume(&Input::LogoutCompleted).unwrap();
            assert_eq!(*machine.state(), State::Missing, "after {inputs:?}");
        }
    }

    #[test]
    fn refresh_failure_clears_session() {
        let mut machine = StateMachine::new();

        machine.consume(&Input::LoginAttempt).unwrap();
        machine.consume(&Input::LoginSucceeded).unwrap();
        machine.consume(&Input::RefreshFailed).unwrap();
        assert_eq!(*machine.state(), State::Missing);
    }

    #[test]
    fn login_success_is_invalid_outside_loading() {
        let mut machine = StateMachine::new();
        assert!(machine.consume(&Input::LoginSucceeded).is_err());

        machine.consume(&Input::NoCredential).unwrap();
        assert!(machine.consume(&Input::LoginFailed).is_err());
    }

    #[test]
    fn status_conversion_and_predicates() {
        assert!(SessionStatus::Ready.is_authenticated());
        assert!(!SessionStatus::Unknown.is_authenticated());
        assert!(!SessionStatus::Missing.is_authenticated());
        assert!(!SessionStatus::Loading.is_authenticated());
        assert!(!SessionStatus::Error.is_authenticated());

        assert!(SessionStatus::Unknown.is_transient());
        assert!(SessionStatus::Loading.is_transient());
        assert!(!SessionStatus::Ready.is_transient());

        assert_eq!(SessionStatus::from(&State::Ready), SessionStatus::Ready);
        assert_eq!(SessionStatus::from(&State::Error), SessionStatus::Error);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Missing).unwrap(),
            r#""missing""#
        );
    }
}
