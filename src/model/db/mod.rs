//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in an DB-friendly way, e.g.:
//!
//! - IDs and datetimes are serialised in MongoDB's own format.

mod image;
pub use image::{ImageType, ProofImage, MAX_IMAGES, MAX_IMAGE_BYTES, MIN_IMAGES};

mod issue;
pub use issue::{Issue, IssueCore, NewIssue};

mod moderation;
pub use moderation::{
    Comment, Moderation, Report, VoteTally, DEFAULT_REPORT_REASON, MAX_COMMENT_CHARS,
};
