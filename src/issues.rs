//! Issue operations, independent of how they are reached.
//!
//! Every mutation goes through [`Store::modify`], so each operation is a single
//! atomic step against one issue.

use chrono::Utc;

use crate::config::Config;
use crate::error::{Error, Result, ValidationError};
use crate::model::{
    api::{
        auth::Viewer, CategoryDescription, CommentDescription, CommentThread, Dashboard,
        IssueDescription, IssueListing, IssueSpec, ReportCount,
    },
    common::{Category, IssueStatus, VoteDirection},
    db::{ImageType, VoteTally},
    mongodb::Id,
};
use crate::store::Store;
use crate::visibility::{in_scope, visible_issues, Visibility};

/// All issues `viewer` may see, newest first.
pub async fn list_issues(store: &Store, config: &Config, viewer: &Viewer) -> Result<IssueListing> {
    let all = store.all_newest_first().await?;
    Ok(visible_issues(all, viewer, config.jurisdiction_fallback()).into())
}

/// File a new issue. Only citizens report issues.
pub async fn create_issue(
    store: &Store,
    viewer: &Viewer,
    spec: IssueSpec,
) -> Result<IssueDescription> {
    let Viewer::Citizen { id: reporter, .. } = viewer else {
        return Err(Error::forbidden("only citizens may report issues"));
    };
    let issue = spec.into_issue(*reporter, Utc::now())?;
    let issue = store.insert(issue).await?;
    info!(
        "Citizen {reporter} reported issue {} ({})",
        issue.id, issue.category
    );
    Ok(issue.into())
}

pub async fn get_issue(store: &Store, id: Id) -> Result<IssueDescription> {
    Ok(store.find(id).await?.into())
}

/// Vote on an issue, replacing any opposite vote by the same voter.
pub async fn vote(
    store: &Store,
    id: Id,
    voter: Id,
    direction: VoteDirection,
) -> Result<VoteTally> {
    let (_, tally) = store
        .modify(id, |issue| Ok(issue.moderation.vote(voter, direction)?))
        .await?;
    debug!("{voter} {direction}d issue {id}");
    Ok(tally)
}

/// Report an issue as false or inappropriate. Each viewer may report an issue once.
pub async fn report(
    store: &Store,
    id: Id,
    reporter: Id,
    reason: Option<&str>,
) -> Result<ReportCount> {
    let now = Utc::now();
    let (_, report_count) = store
        .modify(id, |issue| Ok(issue.moderation.report(reporter, reason, now)?))
        .await?;
    info!("{reporter} reported issue {id}, now at {report_count} reports");
    Ok(ReportCount { report_count })
}

/// Comment on an issue, returning the whole thread.
pub async fn comment(store: &Store, id: Id, author: Id, text: &str) -> Result<CommentThread> {
    let now = Utc::now();
    let (_, comments) = store
        .modify(id, |issue| {
            let thread = issue.moderation.comment(author, text, now)?;
            Ok(thread
                .iter()
                .map(CommentDescription::from)
                .collect::<Vec<_>>())
        })
        .await?;
    Ok(CommentThread { comments })
}

/// Move an issue to a new status.
///
/// Checks run in a fixed order: the viewer's role, then the requested status, then
/// the issue's existence, jurisdiction and finally the workflow.
pub async fn set_status(
    store: &Store,
    config: &Config,
    id: Id,
    viewer: &Viewer,
    status: Option<&str>,
) -> Result<IssueDescription> {
    let Viewer::Official { id: official, .. } = viewer else {
        return Err(Error::forbidden("only officials may change an issue's status"));
    };
    let status: IssueStatus = status
        .ok_or_else(|| ValidationError::InvalidStatus(String::new()))?
        .parse()?;
    let fallback = config.jurisdiction_fallback();
    let workflow = config.status_workflow();

    let (issue, previous) = store
        .modify(id, |issue| {
            if !in_scope(issue.location.as_ref(), viewer, fallback) {
                return Err(Error::forbidden(format!(
                    "issue {id} is outside your jurisdiction"
                )));
            }
            let previous = issue.status;
            workflow.check(previous, status)?;
            if status == IssueStatus::InProgress && issue.assigned_to.is_none() {
                issue.assigned_to = Some(*official);
            }
            issue.status = status;
            Ok(previous)
        })
        .await?;
    info!("Official {official} moved issue {id} from '{previous}' to '{status}'");
    Ok(issue.into())
}

/// Fetch the decoded bytes of one proof image.
pub async fn image(store: &Store, id: Id, index: usize) -> Result<(ImageType, Vec<u8>)> {
    let issue = store.find(id).await?;
    let image = issue
        .images
        .get(index)
        .ok_or_else(|| Error::not_found(format!("Image {index} of issue {id}")))?;
    let bytes = image.bytes().ok_or_else(|| {
        Error::Storage(format!("image {index} of issue {id} is not valid base64"))
    })?;
    Ok((image.mimetype, bytes))
}

/// Issue counts by status over everything an official can see.
pub async fn dashboard(store: &Store, config: &Config, viewer: &Viewer) -> Result<Dashboard> {
    if !matches!(viewer, Viewer::Official { .. }) {
        return Err(Error::forbidden("only officials have a dashboard"));
    }
    let all = store.all_newest_first().await?;
    let Visibility { issues, .. } = visible_issues(all, viewer, config.jurisdiction_fallback());
    Ok(issues.iter().map(|issue| issue.status).collect())
}

pub fn categories() -> Vec<CategoryDescription> {
    Category::ALL.into_iter().map(CategoryDescription::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::{Conflict, ValidationError};
    use crate::model::{
        api::{IssueSpec, LocationSpec},
        common::{Location, StatusWorkflow},
        db::{NewIssue, MAX_COMMENT_CHARS},
    };
    use crate::visibility::{JurisdictionFallback, Scope};

    async fn file(store: &Store, location: Location) -> Id {
        let mut spec = IssueSpec::example();
        spec.location = Some(LocationSpec::Structured(location));
        let issue = create_issue(store, &Viewer::citizen_in_new_delhi(), spec)
            .await
            .unwrap();
        *issue.id
    }

    #[rocket::async_test]
    async fn only_citizens_create() {
        let store = Store::example();
        let result = create_issue(
            &store,
            &Viewer::official_for_new_delhi(),
            IssueSpec::example(),
        )
        .await;
        assert!(matches!(result, Err(Error::Forbidden(_))));
        assert!(store.all_newest_first().await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn image_count_decides_creation() {
        let store = Store::example();
        let citizen = Viewer::citizen_in_new_delhi();
        for (count, ok) in [(1, false), (2, true), (6, false)] {
            let result =
                create_issue(&store, &citizen, IssueSpec::example_with_images(count)).await;
            assert_eq!(result.is_ok(), ok, "{count} images");
        }
        assert_eq!(store.all_newest_first().await.unwrap().len(), 1);
    }

    #[rocket::async_test]
    async fn new_delhi_scenario() {
        let store = Store::example();
        let noida = Location::noida();
        let pincode_only = Location {
            address: "Somewhere in 110001".to_string(),
            pincode: "110001".to_string(),
            ..Location::default()
        };
        let mut city_only = Location::new_delhi();
        city_only.coordinates = None;
        city_only.pincode = String::new();

        let first = file(&store, city_only).await;
        let second = file(&store, noida).await;
        let third = file(&store, pincode_only).await;

        let listing = list_issues(&store, &Config::example(), &Viewer::official_for_new_delhi())
            .await
            .unwrap();
        assert_eq!(listing.total, 3);
        assert_eq!(listing.original_total, 3);
        assert_eq!(listing.scope, Scope::Filtered);
        let ids: Vec<Id> = listing.issues.iter().map(|issue| *issue.id).collect();
        assert_eq!(ids, vec![third, second, first]);

        let listing = list_issues(&store, &Config::example(), &Viewer::official_for_mumbai())
            .await
            .unwrap();
        assert_eq!(listing.total, 0);
        assert_eq!(listing.original_total, 3);
    }

    #[rocket::async_test]
    async fn fallback_policy_applies_to_listing() {
        let store = Store::example();
        file(&store, Location::new_delhi()).await;
        let viewer = Viewer::official_without_jurisdiction();

        let config = Config::with_policies(JurisdictionFallback::ShowAll, StatusWorkflow::Strict);
        let listing = list_issues(&store, &config, &viewer).await.unwrap();
        assert_eq!((listing.total, listing.scope), (1, Scope::Unfiltered));

        let config = Config::with_policies(JurisdictionFallback::ShowNone, StatusWorkflow::Strict);
        let listing = list_issues(&store, &config, &viewer).await.unwrap();
        assert_eq!((listing.total, listing.scope), (0, Scope::Withheld));
        assert_eq!(listing.original_total, 1);
    }

    #[rocket::async_test]
    async fn votes_switch_sides() {
        let store = Store::example();
        let id = file(&store, Location::new_delhi()).await;
        let voter = Id::new();

        let tally = vote(&store, id, voter, VoteDirection::Up).await.unwrap();
        assert_eq!(tally, VoteTally { upvotes: 1, downvotes: 0 });
        let tally = vote(&store, id, voter, VoteDirection::Down).await.unwrap();
        assert_eq!(tally, VoteTally { upvotes: 0, downvotes: 1 });

        let issue = store.find(id).await.unwrap();
        assert!(issue.moderation.voters(VoteDirection::Up).is_empty());
        assert!(issue.moderation.voters(VoteDirection::Down).contains(&voter));
    }

    #[rocket::async_test]
    async fn double_vote_changes_nothing() {
        let store = Store::example();
        let id = file(&store, Location::new_delhi()).await;
        let voter = Id::new();

        vote(&store, id, voter, VoteDirection::Up).await.unwrap();
        let before = store.find(id).await.unwrap();
        let result = vote(&store, id, voter, VoteDirection::Up).await;
        assert!(matches!(
            result,
            Err(Error::Conflict(Conflict::AlreadyVoted(VoteDirection::Up)))
        ));
        assert_eq!(store.find(id).await.unwrap(), before);
    }

    #[rocket::async_test]
    async fn reports_are_unique_per_reporter() {
        let store = Store::example();
        let id = file(&store, Location::new_delhi()).await;
        let reporter = Id::new();

        let count = report(&store, id, reporter, None).await.unwrap();
        assert_eq!(count.report_count, 1);
        let result = report(&store, id, reporter, Some("duplicate")).await;
        assert!(matches!(
            result,
            Err(Error::Conflict(Conflict::AlreadyReported))
        ));
        let count = report(&store, id, Id::new(), Some("spam")).await.unwrap();
        assert_eq!(count.report_count, 2);
    }

    #[rocket::async_test]
    async fn comment_length_limit() {
        let store = Store::example();
        let id = file(&store, Location::new_delhi()).await;
        let author = Id::new();

        let thread = comment(&store, id, author, &"a".repeat(MAX_COMMENT_CHARS))
            .await
            .unwrap();
        assert_eq!(thread.comments.len(), 1);
        let result = comment(&store, id, author, &"a".repeat(MAX_COMMENT_CHARS + 1)).await;
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::CommentTooLong { .. }))
        ));
        let result = comment(&store, id, author, "   ").await;
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::EmptyComment))
        ));
        assert_eq!(store.find(id).await.unwrap().moderation.comments().len(), 1);
    }

    #[rocket::async_test]
    async fn citizens_never_set_status() {
        let store = Store::example();
        let id = file(&store, Location::new_delhi()).await;
        let citizen = Viewer::citizen_in_new_delhi();
        let config = Config::example();

        for status in ["In Progress", "Resolved", "Nonsense"] {
            let result = set_status(&store, &config, id, &citizen, Some(status)).await;
            assert!(matches!(result, Err(Error::Forbidden(_))), "{status}");
        }
        // Even for issues that do not exist.
        let result = set_status(&store, &config, Id::new(), &citizen, Some("Closed")).await;
        assert!(matches!(result, Err(Error::Forbidden(_))));
        // Or without naming a status at all.
        let result = set_status(&store, &config, id, &citizen, None).await;
        assert!(matches!(result, Err(Error::Forbidden(_))));
    }

    #[rocket::async_test]
    async fn status_checks_in_order() {
        let store = Store::example();
        let id = file(&store, Location::new_delhi()).await;
        let official = Viewer::official_for_new_delhi();
        let config = Config::example();

        let result = set_status(&store, &config, Id::new(), &official, Some("Done")).await;
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::InvalidStatus(_)))
        ));
        let result = set_status(&store, &config, Id::new(), &official, None).await;
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::InvalidStatus(_)))
        ));
        let result = set_status(&store, &config, Id::new(), &official, Some("Closed")).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        let mumbai = Viewer::official_for_mumbai();
        let result = set_status(&store, &config, id, &mumbai, Some("Closed")).await;
        assert!(matches!(result, Err(Error::Forbidden(_))));
    }

    #[rocket::async_test]
    async fn strict_workflow() {
        let store = Store::example();
        let id = file(&store, Location::new_delhi()).await;
        let official = Viewer::official_for_new_delhi();
        let config = Config::example();

        let issue = set_status(&store, &config, id, &official, Some("In Progress"))
            .await
            .unwrap();
        assert_eq!(issue.status, IssueStatus::InProgress);
        assert_eq!(issue.assigned_to.map(|id| *id), Some(official.id()));

        // Re-applying is fine, going back is not.
        set_status(&store, &config, id, &official, Some("In Progress"))
            .await
            .unwrap();
        let result = set_status(&store, &config, id, &official, Some("Open")).await;
        assert!(matches!(
            result,
            Err(Error::Conflict(Conflict::IllegalTransition {
                from: IssueStatus::InProgress,
                to: IssueStatus::Open
            }))
        ));

        set_status(&store, &config, id, &official, Some("Resolved"))
            .await
            .unwrap();
        let result = set_status(&store, &config, id, &official, Some("Rejected")).await;
        assert!(matches!(result, Err(Error::Conflict(_))));
        assert_eq!(store.find(id).await.unwrap().status, IssueStatus::Resolved);
    }

    #[rocket::async_test]
    async fn permissive_workflow() {
        let store = Store::example();
        let id = file(&store, Location::new_delhi()).await;
        let official = Viewer::official_for_new_delhi();
        let config =
            Config::with_policies(JurisdictionFallback::ShowAll, StatusWorkflow::Permissive);

        set_status(&store, &config, id, &official, Some("Closed"))
            .await
            .unwrap();
        let issue = set_status(&store, &config, id, &official, Some("Open"))
            .await
            .unwrap();
        assert_eq!(issue.status, IssueStatus::Open);
        assert_eq!(issue.assigned_to, None);
    }

    #[rocket::async_test]
    async fn images_are_served_decoded() {
        let store = Store::example();
        let id = store
            .insert(NewIssue::example(Some(Location::new_delhi())))
            .await
            .unwrap()
            .id;

        let (mimetype, bytes) = image(&store, id, 1).await.unwrap();
        assert_eq!(mimetype, ImageType::Jpeg);
        assert_eq!(bytes, b"hello!");
        assert!(matches!(image(&store, id, 2).await, Err(Error::NotFound(_))));
    }

    #[rocket::async_test]
    async fn dashboard_counts_visible_issues() {
        let store = Store::example();
        let config = Config::example();
        let official = Viewer::official_for_new_delhi();
        file(&store, Location::new_delhi()).await;
        let closed = file(&store, Location::new_delhi()).await;
        file(&store, Location::mumbai()).await;
        set_status(&store, &config, closed, &official, Some("Closed"))
            .await
            .unwrap();

        let counts = dashboard(&store, &config, &official).await.unwrap();
        assert_eq!(counts.total_issues, 2);
        assert_eq!(counts.open_issues, 1);
        assert_eq!(counts.closed_issues, 1);

        let result = dashboard(&store, &config, &Viewer::citizen_in_new_delhi()).await;
        assert!(matches!(result, Err(Error::Forbidden(_))));
    }

    #[test]
    fn every_category_is_listed() {
        let listed = categories();
        assert_eq!(listed.len(), Category::ALL.len());
        assert_eq!(listed[3].name, "Public Safety");
    }
}
