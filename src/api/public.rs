//! Endpoints that need no authentication.

use rocket::{http::ContentType, serde::json::Json, Route};

use crate::error::Result;
use crate::issues;
use crate::model::{
    api::{CategoryDescription, IssueDescription},
    mongodb::Id,
};
use crate::store::Store;

pub fn routes() -> Vec<Route> {
    routes![issue, issue_image, categories]
}

#[get("/issues/<id>")]
pub async fn issue(id: Id, store: Store) -> Result<Json<IssueDescription>> {
    Ok(Json(issues::get_issue(&store, id).await?))
}

#[get("/issues/<id>/images/<index>")]
pub async fn issue_image(id: Id, index: usize, store: Store) -> Result<(ContentType, Vec<u8>)> {
    let (mimetype, bytes) = issues::image(&store, id, index).await?;
    Ok((mimetype.content_type(), bytes))
}

#[get("/categories")]
pub async fn categories() -> Json<Vec<CategoryDescription>> {
    Json(issues::categories())
}
