use rocket::{serde::json::Json, Route, State};

use crate::config::Config;
use crate::error::Result;
use crate::issues;
use crate::model::api::{auth::Viewer, Dashboard};
use crate::store::Store;

pub fn routes() -> Vec<Route> {
    routes![dashboard]
}

#[get("/dashboard")]
pub async fn dashboard(
    viewer: Viewer,
    store: Store,
    config: &State<Config>,
) -> Result<Json<Dashboard>> {
    Ok(Json(issues::dashboard(&store, config, &viewer).await?))
}
