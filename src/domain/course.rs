use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub course_name: String,
    pub description: Option<String>,
    pub skill_type: SkillType,
    pub level: Option<String>,
    pub course_status: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillType {
    Listening,
    Reading,
    Writing,
    Speaking,
    Vocabulary,
    Grammar,
}

impl SkillType {
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "listening" => Some(Self::Listening),
            "reading" => Some(Self::Reading),
            "writing" => Some(Self::Writing),
            "speaking" => Some(Self::Speaking),
            "vocabulary" => Some(Self::Vocabulary),
            "grammar" => Some(Self::Grammar),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Listening => "listening",
            Self::Reading => "reading",
            Self::Writing => "writing",
            Self::Speaking => "speaking",
            Self::Vocabulary => "vocabulary",
            Self::Grammar => "grammar",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Listening => "Listening",
            Self::Reading => "Reading",
            Self::Writing => "Writing",
            Self::Speaking => "Speaking",
            Self::Vocabulary => "Vocabulary",
            Self::Grammar => "Grammar",
        }
    }
}
