use serde::{Deserialize, Serialize};

use super::CommentDescription;

/// A report against an issue. A missing or blank reason gets the default one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSpec {
    #[serde(default)]
    pub reason: Option<String>,
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommentSpec {
    #[serde(default)]
    pub comment: String,
}

/// How many reports an issue has, after filing one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCount {
    pub report_count: usize,
}

/// The full comment thread of an issue, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentThread {
    pub comments: Vec<CommentDescription>,
}
