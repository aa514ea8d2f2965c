use std::fmt::Display;

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::model::{
    common::{Jurisdiction, Location, DEFAULT_CITIZEN_RADIUS_KM},
    mongodb::Id,
};
use crate::visibility::ServiceArea;

/// Different privilege levels.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Role {
    Citizen = 0,
    Official = 1,
}

impl Display for Role {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Citizen => "citizen",
                Self::Official => "official",
            }
        )
    }
}

/// The verified identity of whoever is making a request.
///
/// Citizens carry their home location, officials their jurisdiction; either may be
/// missing if the profile was never completed.
#[derive(Debug, Clone, PartialEq)]
pub enum Viewer {
    Citizen {
        id: Id,
        location: Option<Location>,
    },
    Official {
        id: Id,
        jurisdiction: Option<Jurisdiction>,
    },
}

impl Viewer {
    pub fn id(&self) -> Id {
        match self {
            Self::Citizen { id, .. } | Self::Official { id, .. } => *id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::Citizen { .. } => Role::Citizen,
            Self::Official { .. } => Role::Official,
        }
    }

    /// The area this viewer's issue list is scoped to, if they have declared one.
    pub fn service_area(&self) -> Option<ServiceArea<'_>> {
        let area = match self {
            Self::Citizen { location, .. } => {
                ServiceArea::new(location.as_ref()?, DEFAULT_CITIZEN_RADIUS_KM)
            }
            Self::Official { jurisdiction, .. } => {
                let jurisdiction = jurisdiction.as_ref()?;
                ServiceArea::new(&jurisdiction.location, jurisdiction.effective_radius())
            }
        };
        area.is_usable().then_some(area)
    }
}
