use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::error::{Conflict, ValidationError};
use crate::model::{common::VoteDirection, mongodb::Id};

/// Maximum length of a comment, in characters, after trimming.
pub const MAX_COMMENT_CHARS: usize = 500;
/// Reason recorded when a reporter does not give one.
pub const DEFAULT_REPORT_REASON: &str = "Reported as false or inappropriate";

/// A flag raised against an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub reported_by: Id,
    pub reason: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// A comment left on an issue. Never edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub user: Id,
    pub comment: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Current vote counts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub upvotes: usize,
    pub downvotes: usize,
}

/// Community moderation state of a single issue.
///
/// Fields are only reachable through the methods below, which keep the upvoter and
/// downvoter sets disjoint and each reporter unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moderation {
    #[serde(default)]
    upvoted_by: BTreeSet<Id>,
    #[serde(default)]
    downvoted_by: BTreeSet<Id>,
    #[serde(default)]
    reports: Vec<Report>,
    #[serde(default)]
    comments: Vec<Comment>,
}

impl Moderation {
    pub fn tally(&self) -> VoteTally {
        VoteTally {
            upvotes: self.upvoted_by.len(),
            downvotes: self.downvoted_by.len(),
        }
    }

    pub fn voters(&self, direction: VoteDirection) -> &BTreeSet<Id> {
        match direction {
            VoteDirection::Up => &self.upvoted_by,
            VoteDirection::Down => &self.downvoted_by,
        }
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Record a vote, clearing any opposite vote by the same voter first.
    pub fn vote(&mut self, voter: Id, direction: VoteDirection) -> Result<VoteTally, Conflict> {
        let (same, opposite) = match direction {
            VoteDirection::Up => (&mut self.upvoted_by, &mut self.downvoted_by),
            VoteDirection::Down => (&mut self.downvoted_by, &mut self.upvoted_by),
        };
        if same.contains(&voter) {
            return Err(Conflict::AlreadyVoted(direction));
        }
        opposite.remove(&voter);
        same.insert(voter);
        Ok(self.tally())
    }

    /// File a report, returning the new number of reports.
    pub fn report(
        &mut self,
        reporter: Id,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<usize, Conflict> {
        if self.reports.iter().any(|r| r.reported_by == reporter) {
            return Err(Conflict::AlreadyReported);
        }
        let reason = reason
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .unwrap_or(DEFAULT_REPORT_REASON);
        self.reports.push(Report {
            reported_by: reporter,
            reason: reason.to_string(),
            created_at: now,
        });
        Ok(self.reports.len())
    }

    /// Append a comment, returning the whole thread.
    pub fn comment(
        &mut self,
        author: Id,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<&[Comment], ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyComment);
        }
        if text.chars().count() > MAX_COMMENT_CHARS {
            return Err(ValidationError::CommentTooLong {
                max: MAX_COMMENT_CHARS,
            });
        }
        self.comments.push(Comment {
            user: author,
            comment: text.to_string(),
            created_at: now,
        });
        Ok(&self.comments)
    }
}
