//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - IDs are serialised as hex strings.
//! - Datetimes are serialised as RFC 3339 strings.
//! - Image payloads are never included; they are served on their own.

pub mod auth;
mod dashboard;
mod id;
mod issue;
mod moderation;

pub use dashboard::{CategoryDescription, Dashboard};
pub use id::ApiId;
pub use issue::{
    CommentDescription, ImageDescription, ImageSpec, IssueDescription, IssueListing, IssueSpec,
    LocationSpec, ReportDescription, StatusChange, MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS,
};
pub use moderation::{CommentSpec, CommentThread, ReportCount, ReportSpec};
