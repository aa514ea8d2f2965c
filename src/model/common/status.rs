use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Conflict, ValidationError};

/// States in the issue lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueStatus {
    /// Newly reported, awaiting attention.
    Open,
    /// An official is working on it.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Fixed.
    Resolved,
    /// Closed without further action.
    Closed,
    /// Judged invalid.
    Rejected,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 5] = [
        Self::Open,
        Self::InProgress,
        Self::Resolved,
        Self::Closed,
        Self::Rejected,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
            Self::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed | Self::Rejected)
    }

    /// Successor states reachable in one step under the strict workflow.
    pub fn successors(&self) -> &'static [IssueStatus] {
        match self {
            Self::Open => &[
                Self::InProgress,
                Self::Resolved,
                Self::Closed,
                Self::Rejected,
            ],
            Self::InProgress => &[Self::Resolved, Self::Closed, Self::Rejected],
            Self::Resolved | Self::Closed | Self::Rejected => &[],
        }
    }
}

impl Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IssueStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.name() == s)
            .ok_or_else(|| ValidationError::InvalidStatus(s.to_string()))
    }
}

/// How strictly status changes are policed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusWorkflow {
    /// Only edges of the lifecycle graph are allowed; terminal states stay terminal.
    #[default]
    Strict,
    /// Any status may overwrite any other.
    Permissive,
}

impl StatusWorkflow {
    /// Check that `from -> to` is allowed. Re-applying the current status always is.
    pub fn check(&self, from: IssueStatus, to: IssueStatus) -> Result<(), Conflict> {
        if from == to {
            return Ok(());
        }
        match self {
            Self::Permissive => Ok(()),
            Self::Strict if from.successors().contains(&to) => Ok(()),
            Self::Strict => Err(Conflict::IllegalTransition { from, to }),
        }
    }
}
