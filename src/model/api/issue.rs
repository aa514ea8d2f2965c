use chrono::{DateTime, Utc};
use data_encoding::BASE64;
use rocket::serde::json::Value;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{
    common::{Category, IssueStatus, Location, Priority, VoteDirection},
    db::{
        Comment, ImageType, Issue, NewIssue, ProofImage, VoteTally, MAX_IMAGES, MAX_IMAGE_BYTES,
        MIN_IMAGES,
    },
    mongodb::Id,
};
use crate::visibility::{Scope, Visibility};

use super::ApiId;

/// Longest accepted title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;
/// Longest accepted description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Where an issue is, as submitted: either a bare address or a structured location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationSpec {
    Address(String),
    Structured(Location),
}

impl LocationSpec {
    fn into_location(self) -> Result<Location, ValidationError> {
        let mut location = match self {
            Self::Address(address) => Location {
                address,
                ..Location::default()
            },
            Self::Structured(location) => location,
        };
        location.address = location.address.trim().to_string();
        if location.address.is_empty() {
            return Err(ValidationError::MissingField("location.address"));
        }
        if let Some(coordinates) = &location.coordinates {
            coordinates.validate()?;
        }
        Ok(location)
    }
}

/// A proof image as submitted.
///
/// Fields default so that an incomplete image is reported by its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSpec {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub mimetype: String,
    /// Declared size in bytes; zero counts as missing.
    #[serde(default)]
    pub size: u64,
    /// Base64-encoded image bytes.
    #[serde(default)]
    pub data: String,
}

impl ImageSpec {
    /// Validate this image; `index` is only used to name it in errors.
    fn into_proof(self, index: usize, now: DateTime<Utc>) -> Result<ProofImage, ValidationError> {
        let invalid = |why: String| ValidationError::InvalidImage(format!("image {index}: {why}"));

        let filename = self.filename.trim().to_string();
        if filename.is_empty() {
            return Err(invalid("missing filename".to_string()));
        }
        if self.mimetype.trim().is_empty() {
            return Err(invalid("missing mimetype".to_string()));
        }
        let mimetype = ImageType::from_mime(&self.mimetype)
            .ok_or_else(|| invalid(format!("unsupported type '{}'", self.mimetype)))?;
        if self.size == 0 {
            return Err(invalid("missing size".to_string()));
        }
        if self.data.is_empty() {
            return Err(invalid("missing data".to_string()));
        }
        let bytes = BASE64
            .decode(self.data.as_bytes())
            .map_err(|e| invalid(format!("data is not valid base64 ({e})")))?;
        if bytes.is_empty() {
            return Err(invalid("data is empty".to_string()));
        }
        let size = self.size.max(bytes.len() as u64);
        if size > MAX_IMAGE_BYTES {
            return Err(invalid(format!(
                "{size} bytes exceeds the {MAX_IMAGE_BYTES} byte limit"
            )));
        }

        Ok(ProofImage {
            filename,
            mimetype,
            size,
            data: self.data,
            uploaded_at: now,
        })
    }
}

/// A new issue as submitted by a citizen.
///
/// Everything defaults so that a missing field is reported as such, rather than as
/// a malformed body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IssueSpec {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub location: Option<LocationSpec>,
    #[serde(default)]
    pub images: Vec<ImageSpec>,
}

/// Trim a required text field and check its length.
fn required_text(
    text: String,
    field: &'static str,
    max: usize,
) -> Result<String, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    if text.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(text.to_string())
}

impl IssueSpec {
    /// Validate this spec and turn it into an open issue reported by `reporter`.
    ///
    /// Nothing is partially accepted: the first problem found fails the whole issue.
    pub fn into_issue(self, reporter: Id, now: DateTime<Utc>) -> Result<NewIssue, ValidationError> {
        let title = required_text(self.title, "title", MAX_TITLE_CHARS)?;
        let description = required_text(self.description, "description", MAX_DESCRIPTION_CHARS)?;
        let category = match self.category.trim() {
            "" => return Err(ValidationError::MissingField("category")),
            name => name.parse::<Category>()?,
        };
        let location = self
            .location
            .ok_or(ValidationError::MissingField("location"))?
            .into_location()?;

        let count = self.images.len();
        if !(MIN_IMAGES..=MAX_IMAGES).contains(&count) {
            return Err(ValidationError::InvalidImage(format!(
                "between {MIN_IMAGES} and {MAX_IMAGES} proof images are required, got {count}"
            )));
        }
        let images = self
            .images
            .into_iter()
            .enumerate()
            .map(|(i, image)| image.into_proof(i, now))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewIssue {
            title,
            description,
            category,
            priority: self.priority,
            status: IssueStatus::Open,
            location: Some(location),
            reported_by: reporter,
            assigned_to: None,
            images,
            moderation: Default::default(),
            created_at: now,
            updated_at: now,
            revision: 0,
        })
    }
}

/// Image metadata; the payload itself is served separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescription {
    pub filename: String,
    pub mimetype: ImageType,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&ProofImage> for ImageDescription {
    fn from(image: &ProofImage) -> Self {
        Self {
            filename: image.filename.clone(),
            mimetype: image.mimetype,
            size: image.size,
            uploaded_at: image.uploaded_at,
        }
    }
}

/// A report as shown to API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDescription {
    pub reported_by: ApiId,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// A comment as shown to API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDescription {
    pub user: ApiId,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Comment> for CommentDescription {
    fn from(comment: &Comment) -> Self {
        Self {
            user: comment.user.into(),
            comment: comment.comment.clone(),
            created_at: comment.created_at,
        }
    }
}

/// An API-friendly issue description, without image payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDescription {
    pub id: ApiId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: IssueStatus,
    pub location: Option<Location>,
    pub reported_by: ApiId,
    pub assigned_to: Option<ApiId>,
    pub images: Vec<ImageDescription>,
    pub upvotes: usize,
    pub downvotes: usize,
    pub upvoted_by: Vec<ApiId>,
    pub downvoted_by: Vec<ApiId>,
    pub reports: Vec<ReportDescription>,
    pub comments: Vec<CommentDescription>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Issue> for IssueDescription {
    fn from(issue: Issue) -> Self {
        let VoteTally { upvotes, downvotes } = issue.moderation.tally();
        let voters = |direction: VoteDirection| -> Vec<ApiId> {
            issue
                .moderation
                .voters(direction)
                .iter()
                .copied()
                .map(ApiId::from)
                .collect()
        };
        Self {
            id: issue.id.into(),
            upvoted_by: voters(VoteDirection::Up),
            downvoted_by: voters(VoteDirection::Down),
            reports: issue
                .moderation
                .reports()
                .iter()
                .map(|report| ReportDescription {
                    reported_by: report.reported_by.into(),
                    reason: report.reason.clone(),
                    created_at: report.created_at,
                })
                .collect(),
            comments: issue
                .moderation
                .comments()
                .iter()
                .map(CommentDescription::from)
                .collect(),
            images: issue.images.iter().map(ImageDescription::from).collect(),
            upvotes,
            downvotes,
            title: issue.issue.title,
            description: issue.issue.description,
            category: issue.issue.category,
            priority: issue.issue.priority,
            status: issue.issue.status,
            location: issue.issue.location,
            reported_by: issue.issue.reported_by.into(),
            assigned_to: issue.issue.assigned_to.map(ApiId::from),
            created_at: issue.issue.created_at,
            updated_at: issue.issue.updated_at,
        }
    }
}

/// The issues a viewer may see, with counts before and after filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueListing {
    pub issues: Vec<IssueDescription>,
    pub total: usize,
    pub original_total: usize,
    pub scope: Scope,
}

impl From<Visibility<Issue>> for IssueListing {
    fn from(visible: Visibility<Issue>) -> Self {
        Self {
            issues: visible
                .issues
                .into_iter()
                .map(IssueDescription::from)
                .collect(),
            total: visible.total,
            original_total: visible.original_total,
            scope: visible.scope,
        }
    }
}

/// Requested status change. The status is taken as any JSON value and parsed by
/// hand, so a missing or mistyped status is reported only after the caller's role.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusChange {
    #[serde(default)]
    pub status: Option<Value>,
}

impl StatusChange {
    /// The requested status, if one was given as a string.
    pub fn requested(&self) -> Option<&str> {
        self.status.as_ref().and_then(Value::as_str)
    }
}
