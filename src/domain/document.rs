use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub document_name: String,
    pub document_type: DocumentType,
    pub course_id: Option<Uuid>,
    pub course_name: Option<String>,
    pub file_size_bytes: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Pdf,
    Video,
    Slide,
    Audio,
}

impl DocumentType {
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "pdf" => Some(Self::Pdf),
            "video" => Some(Self::Video),
            "slide" => Some(Self::Slide),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Video => "video",
            Self::Slide => "slide",
            Self::Audio => "audio",
        }
    }
}
