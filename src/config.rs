use std::sync::Arc;

use chrono::Duration;
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{common::StatusWorkflow, mongodb::ensure_indexes_exist};
use crate::store::{IssueStore, MemoryIssueStore, MongoIssueStore, Store};
use crate::visibility::JurisdictionFallback;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    #[serde(default = "default_auth_ttl")]
    auth_ttl: u32,
    #[serde(default = "default_storage_timeout_ms")]
    storage_timeout_ms: u64,
    #[serde(default = "default_update_attempts")]
    update_attempts: u32,
    #[serde(default)]
    jurisdiction_fallback: JurisdictionFallback,
    #[serde(default)]
    status_workflow: StatusWorkflow,
    // secrets
    jwt_secret: String,
}

fn default_auth_ttl() -> u32 {
    3600
}

fn default_storage_timeout_ms() -> u64 {
    5000
}

fn default_update_attempts() -> u32 {
    8
}

impl Config {
    /// Valid lifetime of auth tokens in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Upper bound on any single call to the issue store.
    pub fn storage_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.storage_timeout_ms)
    }

    /// How many times a read-modify-write is attempted before giving up on contention.
    pub fn update_attempts(&self) -> u32 {
        self.update_attempts.max(1)
    }

    /// What viewers without a usable service area get to see.
    pub fn jurisdiction_fallback(&self) -> JurisdictionFallback {
        self.jurisdiction_fallback
    }

    /// Whether status changes must follow the lifecycle graph.
    pub fn status_workflow(&self) -> StatusWorkflow {
        self.status_workflow
    }

    /// Secret key used to verify identity tokens.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the other fairings and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!(
            "Jurisdiction fallback is {:?}, status workflow is {:?}",
            config.jurisdiction_fallback, config.status_workflow
        );

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Which backend holds the issues.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Mongodb,
    Memory,
}

/// Configuration for the issue store.
#[derive(Deserialize)]
struct StoreConfig {
    // non-secrets
    #[serde(default)]
    store: StoreKind,
    // secrets
    db_uri: Option<String>,
}

/// A fairing that loads the store config, connects to the database if needed,
/// performs any setup necessary, and places a [`Store`] into managed state.
/// This fairing depends on [`Config`] being managed, and so must be attached
/// after [`ConfigFairing`].
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Issue store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<StoreConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load store config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        let backend: Arc<dyn IssueStore> = match config.store {
            StoreKind::Memory => {
                warn!("Using the in-memory issue store; nothing will be persisted");
                Arc::new(MemoryIssueStore::new())
            }
            StoreKind::Mongodb => {
                let Some(db_uri) = config.db_uri else {
                    error!("`db_uri` must be set to use the MongoDB issue store");
                    return Err(rocket);
                };
                info!("Loaded database config, connecting...");
                // Construct the connection.
                let client = match MongoClient::with_uri_str(db_uri).await {
                    Ok(client) => client,
                    Err(e) => {
                        error!("Failed to connect to database: {e}");
                        return Err(rocket);
                    }
                };
                let db = client.database(&get_database_name());

                // Ensure the required indexes exist.
                if let Err(e) = ensure_indexes_exist(&db).await {
                    error!("Failed to connect to database: {e}");
                    return Err(rocket);
                }
                info!("...database connection online!");
                Arc::new(MongoIssueStore::new(&db))
            }
        };

        let store = match rocket.state::<Config>() {
            Some(config) => Store::new(backend, config),
            None => {
                error!("Config was not available when setting up the issue store");
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(store);
        Ok(rocket)
    }
}

/// Get the name of the database to use.
fn get_database_name() -> String {
    "civic".to_string()
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Config {
        pub fn example() -> Self {
            Self::example_with_secret("test secret")
        }

        pub fn example_with_secret(secret: &str) -> Self {
            Self {
                auth_ttl: default_auth_ttl(),
                storage_timeout_ms: default_storage_timeout_ms(),
                update_attempts: default_update_attempts(),
                jurisdiction_fallback: JurisdictionFallback::default(),
                status_workflow: StatusWorkflow::default(),
                jwt_secret: secret.to_string(),
            }
        }

        pub fn with_policies(
            jurisdiction_fallback: JurisdictionFallback,
            status_workflow: StatusWorkflow,
        ) -> Self {
            Self {
                jurisdiction_fallback,
                status_workflow,
                ..Self::example()
            }
        }

        pub fn with_update_attempts(update_attempts: u32) -> Self {
            Self {
                update_attempts,
                ..Self::example()
            }
        }

        pub fn with_storage_timeout_ms(storage_timeout_ms: u64) -> Self {
            Self {
                storage_timeout_ms,
                ..Self::example()
            }
        }
    }
}
