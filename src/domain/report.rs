use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A generated, persisted export plus the metadata describing how,
/// when and by whom it was produced. Immutable after creation except
/// for deletion.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub id: Uuid,
    pub report_name: String,
    pub report_type: ReportType,
    pub report_content: Option<String>,
    pub file_path: Option<String>,
    pub file_format: ReportFormat,
    /// As-submitted filter parameters, kept for audit only. Never
    /// replayed against the store.
    pub filters: serde_json::Value,
    pub created_by: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Users,
    Courses,
    Lessons,
    Exams,
    Blogs,
    Documents,
    Roadmaps,
}

impl ReportType {
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "users" => Some(Self::Users),
            "courses" => Some(Self::Courses),
            "lessons" => Some(Self::Lessons),
            "exams" => Some(Self::Exams),
            "blogs" => Some(Self::Blogs),
            "documents" => Some(Self::Documents),
            "roadmaps" => Some(Self::Roadmaps),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Courses => "courses",
            Self::Lessons => "lessons",
            Self::Exams => "exams",
            Self::Blogs => "blogs",
            Self::Documents => "documents",
            Self::Roadmaps => "roadmaps",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Courses => "Courses",
            Self::Lessons => "Lessons",
            Self::Exams => "Exams",
            Self::Blogs => "Blogs",
            Self::Documents => "Documents",
            Self::Roadmaps => "Roadmaps",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Excel,
    Csv,
}

impl ReportFormat {
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "excel" => Some(Self::Excel),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Excel => "excel",
            Self::Csv => "csv",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Excel => "xlsx",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Csv => "text/csv",
        }
    }
}

/// Typed filter snapshot for report generation. Each report type
/// reads the fields that apply to it and ignores the rest; unknown
/// keys are rejected at the boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportFilters {
    pub user_status: Option<bool>,
    pub course_status: Option<bool>,
    pub lesson_status: Option<bool>,
    pub exam_status: Option<bool>,
    pub blog_status: Option<String>,
    pub document_type: Option<String>,
    pub roadmap_status: Option<bool>,
}

/// Sortable columns for report listings. Caller-supplied sort fields
/// are validated against this set before they reach SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSort {
    CreatedAt,
    ReportName,
    ReportType,
}

impl ReportSort {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "created_at" => Some(Self::CreatedAt),
            "report_name" => Some(Self::ReportName),
            "report_type" => Some(Self::ReportType),
            _ => None,
        }
    }

    pub fn as_column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::ReportName => "report_name",
            Self::ReportType => "report_type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
