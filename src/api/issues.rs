use rocket::{response::status::Created, serde::json::Json, Route, State};

use crate::config::Config;
use crate::error::Result;
use crate::issues;
use crate::model::{
    api::{
        auth::Viewer, CommentSpec, CommentThread, IssueDescription, IssueListing, IssueSpec,
        ReportCount, ReportSpec, StatusChange,
    },
    common::VoteDirection,
    db::VoteTally,
    mongodb::Id,
};
use crate::store::Store;

pub fn routes() -> Vec<Route> {
    routes![
        list_issues,
        create_issue,
        upvote,
        downvote,
        report,
        comment,
        set_status,
    ]
}

#[get("/issues")]
pub async fn list_issues(
    viewer: Viewer,
    store: Store,
    config: &State<Config>,
) -> Result<Json<IssueListing>> {
    Ok(Json(issues::list_issues(&store, config, &viewer).await?))
}

#[post("/issues", data = "<spec>", format = "json")]
pub async fn create_issue(
    viewer: Viewer,
    spec: Json<IssueSpec>,
    store: Store,
) -> Result<Created<Json<IssueDescription>>> {
    let issue = issues::create_issue(&store, &viewer, spec.0).await?;
    let location = uri!(super::public::issue(*issue.id)).to_string();
    Ok(Created::new(location).body(Json(issue)))
}

#[post("/issues/<id>/upvote")]
pub async fn upvote(viewer: Viewer, id: Id, store: Store) -> Result<Json<VoteTally>> {
    Ok(Json(
        issues::vote(&store, id, viewer.id(), VoteDirection::Up).await?,
    ))
}

#[post("/issues/<id>/downvote")]
pub async fn downvote(viewer: Viewer, id: Id, store: Store) -> Result<Json<VoteTally>> {
    Ok(Json(
        issues::vote(&store, id, viewer.id(), VoteDirection::Down).await?,
    ))
}

/// The body is optional; without one the default reason is recorded.
#[post("/issues/<id>/report", data = "<report>")]
pub async fn report(
    viewer: Viewer,
    id: Id,
    report: Option<Json<ReportSpec>>,
    store: Store,
) -> Result<Json<ReportCount>> {
    let reason = report.and_then(|report| report.0.reason);
    Ok(Json(
        issues::report(&store, id, viewer.id(), reason.as_deref()).await?,
    ))
}

#[post("/issues/<id>/comment", data = "<comment>", format = "json")]
pub async fn comment(
    viewer: Viewer,
    id: Id,
    comment: Json<CommentSpec>,
    store: Store,
) -> Result<Json<CommentThread>> {
    Ok(Json(
        issues::comment(&store, id, viewer.id(), &comment.comment).await?,
    ))
}

/// A missing or malformed body is treated as naming no status, so the caller's
/// role is still checked first.
#[put("/issues/<id>/status", data = "<change>")]
pub async fn set_status(
    viewer: Viewer,
    id: Id,
    change: Option<Json<StatusChange>>,
    store: Store,
    config: &State<Config>,
) -> Result<Json<IssueDescription>> {
    let change = change.map(|change| change.0).unwrap_or_default();
    Ok(Json(
        issues::set_status(&store, config, id, &viewer, change.requested()).await?,
    ))
}
