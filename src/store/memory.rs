use rocket::tokio::sync::Mutex;

use crate::error::Result;
use crate::model::{
    db::{Issue, NewIssue},
    mongodb::Id,
};

use super::IssueStore;

/// Issues held in process memory. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryIssueStore {
    issues: Mutex<Vec<Issue>>,
}

impl MemoryIssueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[rocket::async_trait]
impl IssueStore for MemoryIssueStore {
    async fn insert(&self, issue: NewIssue) -> Result<Issue> {
        let issue = Issue {
            id: Id::new(),
            issue,
        };
        self.issues.lock().await.push(issue.clone());
        Ok(issue)
    }

    async fn find(&self, id: Id) -> Result<Option<Issue>> {
        let issues = self.issues.lock().await;
        Ok(issues.iter().find(|issue| issue.id == id).cloned())
    }

    async fn find_all_newest_first(&self) -> Result<Vec<Issue>> {
        let mut issues = self.issues.lock().await.clone();
        // Later insertions win ties on creation time.
        issues.reverse();
        issues.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(issues)
    }

    async fn replace_if_unchanged(&self, issue: &Issue, expected_revision: i64) -> Result<bool> {
        let mut issues = self.issues.lock().await;
        match issues.iter_mut().find(|stored| stored.id == issue.id) {
            Some(stored) if stored.revision == expected_revision => {
                *stored = issue.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
