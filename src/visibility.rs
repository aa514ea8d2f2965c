//! Deciding which issues a viewer gets to see.
//!
//! A viewer's profile is reduced to a [`ServiceArea`], which is then compared
//! against each issue's location by an ordered list of matching tiers. The first
//! tier that matches wins; an issue matching no tier is hidden.

use serde::{Deserialize, Serialize};

use crate::geo::distance_between;
use crate::model::{api::auth::Viewer, common::Location, db::Issue};

/// The area a viewer's issue list is scoped to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ServiceArea<'a> {
    pub location: &'a Location,
    pub radius_km: f64,
}

impl<'a> ServiceArea<'a> {
    pub fn new(location: &'a Location, radius_km: f64) -> Self {
        Self {
            location,
            radius_km,
        }
    }

    /// Does this area give at least one tier something to match on?
    pub fn is_usable(&self) -> bool {
        has_city_and_state(self.location)
            || self.location.coordinates.is_some()
            || !self.location.pincode.is_empty()
    }
}

/// The strategy that placed an issue inside a service area.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Tier {
    CityState,
    Distance,
    Pincode,
}

type TierPredicate = fn(&Location, &ServiceArea<'_>) -> bool;

/// Matching tiers in priority order.
pub const TIERS: [(Tier, TierPredicate); 3] = [
    (Tier::CityState, same_city_and_state),
    (Tier::Distance, within_radius),
    (Tier::Pincode, same_pincode),
];

fn has_city_and_state(location: &Location) -> bool {
    !location.city.is_empty() && !location.state.is_empty()
}

/// Tier 1: city and state both equal, ignoring case.
pub fn same_city_and_state(issue: &Location, area: &ServiceArea<'_>) -> bool {
    has_city_and_state(issue)
        && has_city_and_state(area.location)
        && issue.city.to_lowercase() == area.location.city.to_lowercase()
        && issue.state.to_lowercase() == area.location.state.to_lowercase()
}

/// Tier 2: within the service radius, boundary included.
pub fn within_radius(issue: &Location, area: &ServiceArea<'_>) -> bool {
    match (&issue.coordinates, &area.location.coordinates) {
        (Some(issue_point), Some(area_point)) => {
            distance_between(area_point, issue_point) <= area.radius_km
        }
        _ => false,
    }
}

/// Tier 3: identical pincode.
pub fn same_pincode(issue: &Location, area: &ServiceArea<'_>) -> bool {
    !issue.pincode.is_empty() && issue.pincode == area.location.pincode
}

/// The first tier under which `issue_location` falls inside `area`, if any.
/// Issues without a location never match.
pub fn matching_tier(issue_location: Option<&Location>, area: &ServiceArea<'_>) -> Option<Tier> {
    let location = issue_location?;
    TIERS
        .iter()
        .find(|(_, predicate)| predicate(location, area))
        .map(|(tier, _)| *tier)
}

pub fn matches(issue_location: Option<&Location>, area: &ServiceArea<'_>) -> bool {
    matching_tier(issue_location, area).is_some()
}

/// What to show a viewer who has no usable service area.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JurisdictionFallback {
    /// Fail open: every issue is visible.
    #[default]
    ShowAll,
    /// Fail closed: nothing is visible.
    ShowNone,
}

/// How a listing was scoped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    /// Filtered against the viewer's service area.
    Filtered,
    /// The viewer has no service area; everything was shown.
    Unfiltered,
    /// The viewer has no service area; nothing was shown.
    Withheld,
}

/// Anything that may carry a location.
pub trait Located {
    fn location(&self) -> Option<&Location>;
}

impl Located for Issue {
    fn location(&self) -> Option<&Location> {
        self.issue.location.as_ref()
    }
}

/// The visible part of an issue collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Visibility<T> {
    pub issues: Vec<T>,
    /// Count after filtering.
    pub total: usize,
    /// Count before filtering.
    pub original_total: usize,
    pub scope: Scope,
}

/// Is an issue at `location` within what `viewer` may see?
pub fn in_scope(
    location: Option<&Location>,
    viewer: &Viewer,
    fallback: JurisdictionFallback,
) -> bool {
    match viewer.service_area() {
        Some(area) => matches(location, &area),
        None => fallback == JurisdictionFallback::ShowAll,
    }
}

/// Restrict `all` to the issues `viewer` may see, preserving order.
pub fn visible_issues<T: Located>(
    all: Vec<T>,
    viewer: &Viewer,
    fallback: JurisdictionFallback,
) -> Visibility<T> {
    let original_total = all.len();
    let (issues, scope) = match viewer.service_area() {
        Some(area) => {
            let issues: Vec<T> = all
                .into_iter()
                .filter(|issue| {
                    let tier = matching_tier(issue.location(), &area);
                    if let Some(tier) = tier {
                        trace!("Including issue for {} via {tier:?}", viewer.id());
                    }
                    tier.is_some()
                })
                .collect();
            debug!(
                "Filtered {original_total} issues down to {} for {} {}",
                issues.len(),
                viewer.role(),
                viewer.id()
            );
            (issues, Scope::Filtered)
        }
        None => match fallback {
            JurisdictionFallback::ShowAll => {
                warn!(
                    "{} {} has no usable service area; showing all {original_total} issues",
                    viewer.role(),
                    viewer.id()
                );
                (all, Scope::Unfiltered)
            }
            JurisdictionFallback::ShowNone => {
                warn!(
                    "{} {} has no usable service area; withholding {original_total} issues",
                    viewer.role(),
                    viewer.id()
                );
                (Vec::new(), Scope::Withheld)
            }
        },
    };
    Visibility {
        total: issues.len(),
        original_total,
        issues,
        scope,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::geo::distance_km;
    use crate::model::{
        common::{Coordinates, Jurisdiction},
        mongodb::Id,
    };

    fn location(
        city: &str,
        state: &str,
        pincode: &str,
        coordinates: Option<(f64, f64)>,
    ) -> Location {
        Location {
            address: "somewhere".to_string(),
            coordinates: coordinates.map(|(lat, lon)| Coordinates::new(lat, lon)),
            city: city.to_string(),
            state: state.to_string(),
            pincode: pincode.to_string(),
        }
    }

    impl Located for Location {
        fn location(&self) -> Option<&Location> {
            Some(self)
        }
    }

    impl Located for Option<Location> {
        fn location(&self) -> Option<&Location> {
            self.as_ref()
        }
    }

    #[test]
    fn city_and_state_match_ignores_everything_else() {
        let home = location("New Delhi", "Delhi", "110001", Some((28.6139, 77.2090)));
        let area = ServiceArea::new(&home, 1.0);
        // Far away coordinates and another pincode.
        let issue = location("new delhi", "DELHI", "999999", Some((-33.86, 151.20)));
        assert_eq!(matching_tier(Some(&issue), &area), Some(Tier::CityState));
    }

    #[test]
    fn city_alone_is_not_enough() {
        let home = location("New Delhi", "Delhi", "", None);
        let area = ServiceArea::new(&home, 10.0);
        let issue = location("New Delhi", "", "", None);
        assert!(!same_city_and_state(&issue, &area));
        assert_eq!(matching_tier(Some(&issue), &area), None);
    }

    #[test]
    fn distance_boundary_is_inclusive() {
        let home = location("", "", "", Some((28.6139, 77.2090)));
        let issue = location("", "", "", Some((28.60, 77.20)));
        let exact = distance_km(28.6139, 77.2090, 28.60, 77.20);

        let area = ServiceArea::new(&home, exact);
        assert_eq!(matching_tier(Some(&issue), &area), Some(Tier::Distance));

        let area = ServiceArea::new(&home, exact - 1e-9);
        assert_eq!(matching_tier(Some(&issue), &area), None);
    }

    #[test]
    fn later_tiers_still_apply_beyond_the_radius() {
        let home = location("", "", "110001", Some((28.6139, 77.2090)));
        let area = ServiceArea::new(&home, 0.5);
        let issue = location("", "", "110001", Some((28.60, 77.20)));
        assert!(!within_radius(&issue, &area));
        assert_eq!(matching_tier(Some(&issue), &area), Some(Tier::Pincode));
    }

    #[test]
    fn pincode_is_exact() {
        let home = location("", "", "110001", None);
        let area = ServiceArea::new(&home, 10.0);
        assert!(same_pincode(&location("", "", "110001", None), &area));
        assert!(!same_pincode(&location("", "", "110001 ", None), &area));

        let nowhere = location("", "", "", None);
        let empty_area = ServiceArea::new(&nowhere, 10.0);
        assert!(!same_pincode(&nowhere, &empty_area));
    }

    #[test]
    fn missing_location_never_matches() {
        for home in [
            location("New Delhi", "Delhi", "110001", Some((28.6139, 77.2090))),
            location("", "", "110001", None),
        ] {
            let area = ServiceArea::new(&home, f64::MAX);
            assert_eq!(matching_tier(None, &area), None);
        }
    }

    #[test]
    fn new_delhi_official_sees_all_three() {
        let viewer = Viewer::official_for_new_delhi();
        let issues = vec![
            location("New Delhi", "Delhi", "", None),
            location("Noida", "UP", "", Some((28.60, 77.20))),
            location("", "", "110001", None),
        ];
        let area = viewer.service_area().unwrap();
        let tiers: Vec<_> = issues
            .iter()
            .map(|issue| matching_tier(Some(issue), &area))
            .collect();
        assert_eq!(
            tiers,
            vec![Some(Tier::CityState), Some(Tier::Distance), Some(Tier::Pincode)]
        );

        let visible = visible_issues(issues.clone(), &viewer, JurisdictionFallback::ShowAll);
        assert_eq!(visible.issues, issues);
        assert_eq!(visible.total, 3);
        assert_eq!(visible.original_total, 3);
        assert_eq!(visible.scope, Scope::Filtered);
    }

    #[test]
    fn filtering_preserves_order() {
        let viewer = Viewer::official_for_mumbai();
        let issues = vec![
            Some(Location::mumbai()),
            Some(Location::new_delhi()),
            None,
            Some(location("MUMBAI", "maharashtra", "", None)),
        ];
        let visible = visible_issues(issues.clone(), &viewer, JurisdictionFallback::ShowAll);
        assert_eq!(visible.issues, vec![issues[0].clone(), issues[3].clone()]);
        assert_eq!(visible.total, 2);
        assert_eq!(visible.original_total, 4);
    }

    #[test]
    fn citizens_are_scoped_to_five_km() {
        let viewer = Viewer::Citizen {
            id: Id::new(),
            location: Some(location("", "", "", Some((28.6139, 77.2090)))),
        };
        // Roughly 1.8km and 8.8km away.
        let near = location("", "", "", Some((28.60, 77.20)));
        let far = location("", "", "", Some((28.68, 77.25)));
        let visible = visible_issues(
            vec![near.clone(), far],
            &viewer,
            JurisdictionFallback::ShowAll,
        );
        assert_eq!(visible.issues, vec![near]);

        // The same point is within an official's default radius.
        let official = Viewer::Official {
            id: Id::new(),
            jurisdiction: Some(Jurisdiction {
                location: location("", "", "", Some((28.6139, 77.2090))),
                service_radius: 10.0,
            }),
        };
        let far = location("", "", "", Some((28.68, 77.25)));
        assert_eq!(
            visible_issues(vec![far], &official, JurisdictionFallback::ShowAll).total,
            1
        );
    }

    #[test]
    fn fallback_policy_is_reported() {
        let viewer = Viewer::official_without_jurisdiction();
        let issues = vec![Location::mumbai(), Location::new_delhi()];

        let open = visible_issues(issues.clone(), &viewer, JurisdictionFallback::ShowAll);
        assert_eq!(open.scope, Scope::Unfiltered);
        assert_eq!(open.total, 2);

        let closed = visible_issues(issues, &viewer, JurisdictionFallback::ShowNone);
        assert_eq!(closed.scope, Scope::Withheld);
        assert_eq!(closed.total, 0);
        assert_eq!(closed.original_total, 2);

        // An empty match is distinguishable from the fallback.
        let mumbai = Viewer::official_for_mumbai();
        let none = visible_issues(
            vec![Location::new_delhi()],
            &mumbai,
            JurisdictionFallback::ShowAll,
        );
        assert_eq!(none.scope, Scope::Filtered);
        assert_eq!(none.total, 0);
    }

    #[test]
    fn in_scope_follows_fallback() {
        let official = Viewer::official_for_new_delhi();
        let delhi = Location::new_delhi();
        let mumbai = Location::mumbai();
        assert!(in_scope(Some(&delhi), &official, JurisdictionFallback::ShowNone));
        assert!(!in_scope(Some(&mumbai), &official, JurisdictionFallback::ShowAll));

        let misconfigured = Viewer::official_without_jurisdiction();
        assert!(in_scope(Some(&mumbai), &misconfigured, JurisdictionFallback::ShowAll));
        assert!(!in_scope(Some(&mumbai), &misconfigured, JurisdictionFallback::ShowNone));
    }
}
