//! Worker lifecycle state machine.
//!
//! ```text
//! Installing --install-succeeded--> Waiting --activate-started--> Activating --activate-finished--> Active
//!     |                                                                                               |
//!     +--install-failed--> Redundant <------------------------superseded------------------------------+
//! ```
//!
//! `activate-started` is only accepted from `Waiting` when skip-waiting has
//! been requested or no incumbent worker still controls clients.
//! `superseded` is accepted from every state except `Redundant`.

use std::fmt;

use pwa_core::Error;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Installing,
    Waiting,
    Activating,
    Active,
    Redundant,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Installing => "installing",
            LifecycleState::Waiting => "waiting",
            LifecycleState::Activating => "activating",
            LifecycleState::Active => "active",
            LifecycleState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    InstallSucceeded,
    InstallFailed,
    ActivateStarted,
    ActivateFinished,
    Superseded,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trigger::InstallSucceeded => "install-succeeded",
            Trigger::InstallFailed => "install-failed",
            Trigger::ActivateStarted => "activate-started",
            Trigger::ActivateFinished => "activate-finished",
            Trigger::Superseded => "superseded",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: LifecycleState,
    skip_waiting: bool,
    incumbent: bool,
    clients_claimed: bool,
    install_claimed: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// A fresh worker with no previous version controlling clients.
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Installing,
            skip_waiting: false,
            incumbent: false,
            clients_claimed: false,
            install_claimed: false,
        }
    }

    /// A fresh worker installed while an older version still controls clients.
    pub fn replacing_incumbent() -> Self {
        Self { incumbent: true, ..Self::new() }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting
    }

    pub fn controls_clients(&self) -> bool {
        self.state == LifecycleState::Active && self.clients_claimed
    }

    /// Request activation without waiting for the incumbent's clients to close.
    pub fn skip_waiting(&mut self) {
        self.skip_waiting = true;
    }

    /// Whether a `Waiting` worker may start activating now.
    pub fn may_activate(&self) -> bool {
        self.state == LifecycleState::Waiting && (self.skip_waiting || !self.incumbent)
    }

    /// Claim the install phase. Only one install may run per worker.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` if the worker is past `Installing`
    /// or another install already holds the claim.
    pub fn begin_install(&mut self) -> Result<(), Error> {
        if self.state != LifecycleState::Installing || self.install_claimed {
            return Err(Error::InvalidTransition { state: self.state.to_string(), trigger: "install-started".to_string() });
        }
        self.install_claimed = true;
        Ok(())
    }

    /// Apply a trigger, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` if the trigger is not accepted in the
    /// current state; the state is left unchanged.
    pub fn apply(&mut self, trigger: Trigger) -> Result<LifecycleState, Error> {
        let next = match (self.state, trigger) {
            (LifecycleState::Installing, Trigger::InstallSucceeded) => LifecycleState::Waiting,
            (LifecycleState::Installing, Trigger::InstallFailed) => LifecycleState::Redundant,
            (LifecycleState::Waiting, Trigger::ActivateStarted) if self.may_activate() => LifecycleState::Activating,
            (LifecycleState::Activating, Trigger::ActivateFinished) => LifecycleState::Active,
            (state, Trigger::Superseded) if state != LifecycleState::Redundant => LifecycleState::Redundant,
            (state, trigger) => {
                return Err(Error::InvalidTransition { state: state.to_string(), trigger: trigger.to_string() });
            }
        };

        match next {
            LifecycleState::Active => {
                self.clients_claimed = true;
                self.incumbent = false;
            }
            LifecycleState::Redundant => self.clients_claimed = false,
            _ => {}
        }

        tracing::info!(from = %self.state, to = %next, %trigger, "worker lifecycle transition");
        self.state = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), LifecycleState::Installing);
        assert_eq!(lifecycle.apply(Trigger::InstallSucceeded).unwrap(), LifecycleState::Waiting);
        assert_eq!(lifecycle.apply(Trigger::ActivateStarted).unwrap(), LifecycleState::Activating);
        assert!(!lifecycle.controls_clients());
        assert_eq!(lifecycle.apply(Trigger::ActivateFinished).unwrap(), LifecycleState::Active);
        assert!(lifecycle.controls_clients());
    }

    #[test]
    fn test_install_failure_is_redundant() {
        let mut lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.apply(Trigger::InstallFailed).unwrap(), LifecycleState::Redundant);
        assert!(lifecycle.apply(Trigger::ActivateStarted).is_err());
        assert!(lifecycle.apply(Trigger::Superseded).is_err());
    }

    #[test]
    fn test_incumbent_blocks_activation_until_skip_waiting() {
        let mut lifecycle = Lifecycle::replacing_incumbent();
        lifecycle.apply(Trigger::InstallSucceeded).unwrap();

        let err = lifecycle.apply(Trigger::ActivateStarted).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
        assert_eq!(lifecycle.state(), LifecycleState::Waiting);

        lifecycle.skip_waiting();
        assert!(lifecycle.may_activate());
        assert_eq!(lifecycle.apply(Trigger::ActivateStarted).unwrap(), LifecycleState::Activating);
    }

    #[test]
    fn test_invalid_trigger_leaves_state() {
        let mut lifecycle = Lifecycle::new();
        assert!(lifecycle.apply(Trigger::ActivateFinished).is_err());
        assert_eq!(lifecycle.state(), LifecycleState::Installing);
    }

    #[test]
    fn test_superseded_drops_control() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.apply(Trigger::InstallSucceeded).unwrap();
        lifecycle.apply(Trigger::ActivateStarted).unwrap();
        lifecycle.apply(Trigger::ActivateFinished).unwrap();

        assert_eq!(lifecycle.apply(Trigger::Superseded).unwrap(), LifecycleState::Redundant);
        assert!(!lifecycle.controls_clients());
    }

    #[test]
    fn test_install_claimed_once() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.begin_install().unwrap();

        let err = lifecycle.begin_install().unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
        assert_eq!(lifecycle.state(), LifecycleState::Installing);

        lifecycle.apply(Trigger::InstallSucceeded).unwrap();
        assert!(lifecycle.begin_install().is_err());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(LifecycleState::Activating.to_string(), "activating");
        assert_eq!(Trigger::ActivateStarted.to_string(), "activate-started");
    }
}
