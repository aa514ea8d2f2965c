use mongodb::{
    bson::doc,
    options::{FindOptions, ReplaceOptions},
    Database,
};
use rocket::futures::TryStreamExt;

use crate::error::{Error, Result};
use crate::model::{
    db::{Issue, NewIssue},
    mongodb::{Coll, Id},
};

use super::IssueStore;

/// Issues held in the `issues` collection of a MongoDB database.
pub struct MongoIssueStore {
    issues: Coll<Issue>,
    new_issues: Coll<NewIssue>,
}

impl MongoIssueStore {
    pub fn new(db: &Database) -> Self {
        Self {
            issues: Coll::from_db(db),
            new_issues: Coll::from_db(db),
        }
    }
}

#[rocket::async_trait]
impl IssueStore for MongoIssueStore {
    async fn insert(&self, issue: NewIssue) -> Result<Issue> {
        let id: Id = self
            .new_issues
            .insert_one(&issue, None)
            .await?
            .inserted_id
            .as_object_id()
            .ok_or_else(|| Error::Storage("inserted issue has no object ID".to_string()))?
            .into();
        Ok(Issue { id, issue })
    }

    async fn find(&self, id: Id) -> Result<Option<Issue>> {
        Ok(self.issues.find_one(id.as_doc(), None).await?)
    }

    async fn find_all_newest_first(&self) -> Result<Vec<Issue>> {
        let options = FindOptions::builder()
            .sort(doc! {"created_at": -1, "_id": -1})
            .build();
        let issues = self
            .issues
            .find(None, options)
            .await?
            .try_collect()
            .await?;
        Ok(issues)
    }

    async fn replace_if_unchanged(&self, issue: &Issue, expected_revision: i64) -> Result<bool> {
        // Documents written before revisions existed count as revision 0.
        let revision_filter = if expected_revision == 0 {
            doc! {"$in": [0_i64, null]}
        } else {
            doc! {"$eq": expected_revision}
        };
        let filter = doc! {
            "_id": issue.id,
            "revision": revision_filter,
        };
        let result = self
            .new_issues
            .replace_one(filter, &issue.issue, ReplaceOptions::default())
            .await?;
        Ok(result.matched_count == 1)
    }
}
