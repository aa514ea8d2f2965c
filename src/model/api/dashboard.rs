use serde::{Deserialize, Serialize};

use crate::model::common::{Category, IssueStatus};

/// Issue counts by status, over the issues an official can see.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total_issues: usize,
    pub open_issues: usize,
    pub in_progress_issues: usize,
    pub resolved_issues: usize,
    pub closed_issues: usize,
    pub rejected_issues: usize,
}

impl FromIterator<IssueStatus> for Dashboard {
    fn from_iter<I: IntoIterator<Item = IssueStatus>>(statuses: I) -> Self {
        let mut dashboard = Self::default();
        for status in statuses {
            dashboard.total_issues += 1;
            *match status {
                IssueStatus::Open => &mut dashboard.open_issues,
                IssueStatus::InProgress => &mut dashboard.in_progress_issues,
                IssueStatus::Resolved => &mut dashboard.resolved_issues,
                IssueStatus::Closed => &mut dashboard.closed_issues,
                IssueStatus::Rejected => &mut dashboard.rejected_issues,
            } += 1;
        }
        dashboard
    }
}

/// A category as listed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDescription {
    pub name: String,
    pub description: String,
}

impl From<Category> for CategoryDescription {
    fn from(category: Category) -> Self {
        Self {
            name: category.name().to_string(),
            description: category.description().to_string(),
        }
    }
}
