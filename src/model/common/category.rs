use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The fixed set of issue categories.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Infrastructure,
    Transportation,
    Environment,
    #[serde(rename = "Public Safety")]
    PublicSafety,
    Sanitation,
    #[serde(rename = "Parks & Recreation")]
    ParksAndRecreation,
    #[serde(rename = "Public Health")]
    PublicHealth,
    Technology,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Self::Infrastructure,
        Self::Transportation,
        Self::Environment,
        Self::PublicSafety,
        Self::Sanitation,
        Self::ParksAndRecreation,
        Self::PublicHealth,
        Self::Technology,
        Self::Other,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Infrastructure => "Infrastructure",
            Self::Transportation => "Transportation",
            Self::Environment => "Environment",
            Self::PublicSafety => "Public Safety",
            Self::Sanitation => "Sanitation",
            Self::ParksAndRecreation => "Parks & Recreation",
            Self::PublicHealth => "Public Health",
            Self::Technology => "Technology",
            Self::Other => "Other",
        }
    }

    /// Short description shown alongside the category name.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Infrastructure => "Roads, bridges, buildings",
            Self::Transportation => "Traffic, buses, parking",
            Self::Environment => "Pollution, trees, water bodies",
            Self::PublicSafety => "Street lights, security, hazards",
            Self::Sanitation => "Garbage, drains, public toilets",
            Self::ParksAndRecreation => "Parks, playgrounds, sports facilities",
            Self::PublicHealth => "Disease outbreaks, stagnant water, clinics",
            Self::Technology => "Public Wi-Fi, e-governance services",
            Self::Other => "Other civic issues",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.name() == s)
            .ok_or_else(|| ValidationError::InvalidCategory(s.to_string()))
    }
}
