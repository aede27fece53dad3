use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LifecycleError, Result};

/// State of the provisioning lifecycle.
///
/// `Initial` is the synthetic state before anything was persisted; it is
/// never written to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisioningState {
    Initial,
    Started,
    Completed,
    Error,
    Interrupt,
    Reset,
}

impl ProvisioningState {
    pub const ALL: [Self; 6] = [
        Self::Initial,
        Self::Started,
        Self::Completed,
        Self::Error,
        Self::Interrupt,
        Self::Reset,
    ];

    /// States this state may legally move to.
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Initial => &[Self::Started, Self::Reset],
            Self::Started => &[Self::Completed, Self::Error, Self::Reset, Self::Interrupt],
            Self::Interrupt => &[Self::Reset],
            Self::Completed | Self::Error => &[Self::Started, Self::Reset],
            Self::Reset => &[Self::Started],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        self.allowed_transitions().contains(&to)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "INITIAL",
            Self::Started => "STARTED",
            Self::Completed => "COMPLETED",
            Self::Error => "ERROR",
            Self::Interrupt => "INTERRUPT",
            Self::Reset => "RESET",
        }
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a transition against the lifecycle table.
///
/// Pure check; nothing is persisted.
///
/// # Errors
///
/// Returns [`LifecycleError::InvalidTransition`] if `to` is not reachable from `from`.
pub fn check_state_transition(from: ProvisioningState, to: ProvisioningState) -> Result<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition { from, to })
    }
}
