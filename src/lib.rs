#[macro_use]
extern crate rocket;
#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use config::{ConfigFairing, StoreFairing};
use logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod issues;
pub mod logging;
pub mod model;
pub mod store;
pub mod visibility;

pub use config::Config;

/// Build the server from `Rocket.toml` and the environment.
pub fn build() -> Rocket<Build> {
    with_fairings_and_routes(rocket::build())
}

fn with_fairings_and_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .attach(ConfigFairing)
        .attach(StoreFairing)
        .attach(LoggerFairing)
        .mount("/", api::routes())
}

/// A server over a fresh in-memory store, with a fixed token secret.
#[cfg(test)]
pub(crate) fn rocket_for_tests() -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("store", "memory"))
        .merge(("jwt_secret", "test secret"));
    with_fairings_and_routes(rocket::custom(figment))
}
