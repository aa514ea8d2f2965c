use std::fmt::Display;

use chrono::{DateTime, Utc};
use data_encoding::BASE64;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use rocket::http::ContentType;
use serde::{Deserialize, Serialize};

/// Largest accepted image, in bytes.
pub const MAX_IMAGE_BYTES: u64 = 2_097_152;
/// Fewest proof images an issue may be filed with.
pub const MIN_IMAGES: usize = 2;
/// Most proof images an issue may be filed with.
pub const MAX_IMAGES: usize = 5;

/// Accepted image formats.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/jpg")]
    Jpg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    Webp,
}

impl ImageType {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(Self::Jpeg),
            "image/jpg" => Some(Self::Jpg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Jpg => "image/jpg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Jpeg | Self::Jpg => ContentType::JPEG,
            Self::Png => ContentType::PNG,
            Self::Webp => ContentType::WEBP,
        }
    }
}

impl Display for ImageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime())
    }
}

/// A photo submitted as proof of an issue. The payload is kept base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofImage {
    pub filename: String,
    pub mimetype: ImageType,
    pub size: u64,
    pub data: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub uploaded_at: DateTime<Utc>,
}

impl ProofImage {
    /// Decode the stored payload.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        BASE64.decode(self.data.as_bytes()).ok()
    }
}
