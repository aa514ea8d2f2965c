use rocket::Route;

mod dashboard;
mod issues;
mod public;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(issues::routes());
    routes.extend(public::routes());
    routes.extend(dashboard::routes());
    routes
}
