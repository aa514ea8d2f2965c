//! Persistence of issues.
//!
//! Backends implement [`IssueStore`]; the rest of the crate goes through [`Store`],
//! which bounds every call with a timeout and turns single-issue mutations into
//! compare-and-swap loops so concurrent writers never lose each other's updates.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rocket::{
    request::{self, FromRequest, Request},
    tokio::time::timeout,
    State,
};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    db::{Issue, NewIssue},
    mongodb::Id,
};

mod memory;
mod mongo;

pub use memory::MemoryIssueStore;
pub use mongo::MongoIssueStore;

/// A document store holding issues.
#[rocket::async_trait]
pub trait IssueStore: Send + Sync {
    /// Insert a new issue, assigning it an ID.
    async fn insert(&self, issue: NewIssue) -> Result<Issue>;

    async fn find(&self, id: Id) -> Result<Option<Issue>>;

    /// Every issue, most recently created first.
    async fn find_all_newest_first(&self) -> Result<Vec<Issue>>;

    /// Overwrite the stored issue with `issue`, but only if the stored revision
    /// is still `expected_revision`. Returns whether the write happened.
    async fn replace_if_unchanged(&self, issue: &Issue, expected_revision: i64) -> Result<bool>;
}

/// Handle on the configured [`IssueStore`].
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn IssueStore>,
    timeout: Duration,
    attempts: u32,
}

impl Store {
    pub fn new(backend: Arc<dyn IssueStore>, config: &Config) -> Self {
        Self {
            backend,
            timeout: config.storage_timeout(),
            attempts: config.update_attempts(),
        }
    }

    /// Run a backend call, giving up once the timeout expires.
    async fn bounded<T, F>(&self, what: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        timeout(self.timeout, call).await.map_err(|_| {
            Error::Storage(format!("{what} timed out after {:?}", self.timeout))
        })?
    }

    pub async fn insert(&self, issue: NewIssue) -> Result<Issue> {
        self.bounded("insert", self.backend.insert(issue)).await
    }

    /// Fetch an issue, failing if it does not exist.
    pub async fn find(&self, id: Id) -> Result<Issue> {
        self.bounded("lookup", self.backend.find(id))
            .await?
            .ok_or_else(|| Error::not_found(format!("Issue {id}")))
    }

    pub async fn all_newest_first(&self) -> Result<Vec<Issue>> {
        self.bounded("listing", self.backend.find_all_newest_first())
            .await
    }

    /// Atomically apply `apply` to the issue with the given ID.
    ///
    /// The issue is read, modified in memory and written back only if nobody else
    /// wrote it in between; otherwise the whole step is retried against the fresh
    /// state. If `apply` fails, nothing is written.
    pub async fn modify<T, F>(&self, id: Id, mut apply: F) -> Result<(Issue, T)>
    where
        F: FnMut(&mut Issue) -> Result<T> + Send,
        T: Send,
    {
        for attempt in 1..=self.attempts {
            let mut issue = self.find(id).await?;
            let expected = issue.revision;
            let output = apply(&mut issue)?;
            issue.revision = expected + 1;
            issue.updated_at = Utc::now();

            let written = self
                .bounded(
                    "update",
                    self.backend.replace_if_unchanged(&issue, expected),
                )
                .await?;
            if written {
                return Ok((issue, output));
            }
            debug!("Issue {id} changed during update attempt {attempt}, retrying");
        }
        warn!("Giving up on issue {id} after {} contended attempts", self.attempts);
        Err(Error::Storage(format!(
            "issue {id} is too busy to update, try again"
        )))
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Store {
    type Error = ();

    /// Get the store from managed state.
    ///
    /// Panics iff the [`Store`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let store = req.guard::<&State<Store>>().await.unwrap();
        request::Outcome::Success(store.inner().clone())
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Store {
        /// A store over a fresh in-memory backend.
        pub fn example() -> Self {
            Self::new(Arc::new(MemoryIssueStore::new()), &Config::example())
        }
    }
}
