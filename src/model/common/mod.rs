mod category;
mod location;
mod status;

pub use category::Category;
pub use location::{
    Coordinates, Jurisdiction, Location, DEFAULT_CITIZEN_RADIUS_KM, DEFAULT_OFFICIAL_RADIUS_KM,
};
pub use status::{IssueStatus, StatusWorkflow};

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Urgency assigned to an issue at intake.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Which way a vote goes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl Display for VoteDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Up => "upvote",
            Self::Down => "downvote",
        })
    }
}
