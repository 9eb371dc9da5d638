use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: Uuid,
    pub exam_title: String,
    pub exam_type: Option<String>,
    pub duration_minutes: Option<i32>,
    pub total_questions: Option<i32>,
    pub exam_status: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
