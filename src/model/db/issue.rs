use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{Category, IssueStatus, Location, Priority},
    mongodb::Id,
};

use super::{image::ProofImage, moderation::Moderation};

/// Core issue data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueCore {
    pub title: String,
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    pub status: IssueStatus,
    /// Always set at intake, but older documents may lack it.
    #[serde(default)]
    pub location: Option<Location>,
    pub reported_by: Id,
    #[serde(default)]
    pub assigned_to: Option<Id>,
    pub images: Vec<ProofImage>,
    #[serde(flatten)]
    pub moderation: Moderation,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
    /// Bumped on every write; guards against lost updates.
    #[serde(default)]
    pub revision: i64,
}

/// An issue without an ID.
pub type NewIssue = IssueCore;

/// An issue from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub issue: IssueCore,
}

impl Deref for Issue {
    type Target = IssueCore;

    fn deref(&self) -> &Self::Target {
        &self.issue
    }
}

impl DerefMut for Issue {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.issue
    }
}
