use anyhow::Result;
use sqlx::{Postgres, QueryBuilder, Row};
use time::OffsetDateTime;

use crate::domain::course::SkillType;
use crate::domain::report::{ReportFilters, ReportType};
use crate::infra::db::Db;

/// One exported row flattened to an ordered column-label → value list.
/// Produced fresh for each export, never persisted.
pub type FlatRecord = Vec<(&'static str, String)>;

const TEXT_PREVIEW_LEN: usize = 200;

/// Loads the rows for a report type and flattens each into a
/// [`FlatRecord`]. One arm per report type; every arm is a read plus
/// a pure mapping.
#[derive(Clone)]
pub struct ReportFormatter {
    db: Db,
}

impl ReportFormatter {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn load(
        &self,
        report_type: ReportType,
        filters: &ReportFilters,
    ) -> Result<Vec<FlatRecord>> {
        match report_type {
            ReportType::Users => self.load_users(filters).await,
            ReportType::Courses => self.load_courses(filters).await,
            ReportType::Lessons => self.load_lessons(filters).await,
            ReportType::Exams => self.load_exams(filters).await,
            ReportType::Blogs => self.load_blogs(filters).await,
            ReportType::Documents => self.load_documents(filters).await,
            ReportType::Roadmaps => self.load_roadmaps(filters).await,
        }
    }

    async fn load_users(&self, filters: &ReportFilters) -> Result<Vec<FlatRecord>> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT full_name, email, role, user_status, created_at FROM users WHERE 1 = 1",
        );
        if let Some(status) = filters.user_status {
            query.push(" AND user_status = ").push_bind(status);
        }
        query.push(" ORDER BY created_at, full_name");
        let rows = query.build().fetch_all(self.db.pool()).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                vec![
                    ("Full Name", row.get::<String, _>("full_name")),
                    ("Email", row.get::<String, _>("email")),
                    (
                        "Role",
                        row.get::<Option<String>, _>("role").unwrap_or_default(),
                    ),
                    (
                        "Status",
                        status_label(row.get::<bool, _>("user_status")).to_string(),
                    ),
                    ("Created At", long_date(row.get("created_at"))),
                ]
            })
            .collect())
    }

    async fn load_courses(&self, filters: &ReportFilters) -> Result<Vec<FlatRecord>> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT course_name, description, skill_type, level, course_status, created_at \
             FROM courses WHERE 1 = 1",
        );
        if let Some(status) = filters.course_status {
            query.push(" AND course_status = ").push_bind(status);
        }
        query.push(" ORDER BY created_at, course_name");
        let rows = query.build().fetch_all(self.db.pool()).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let skill: String = row.get("skill_type");
                let skill = SkillType::from_db(&skill).map(|s| s.label()).unwrap_or("");
                vec![
                    ("Course Name", row.get::<String, _>("course_name")),
                    ("Skill", skill.to_string()),
                    (
                        "Level",
                        row.get::<Option<String>, _>("level").unwrap_or_default(),
                    ),
                    (
                        "Status",
                        status_label(row.get::<bool, _>("course_status")).to_string(),
                    ),
                    (
                        "Description",
                        truncate_text(
                            &row.get::<Option<String>, _>("description")
                                .unwrap_or_default(),
                        ),
                    ),
                    ("Created At", long_date(row.get("created_at"))),
                ]
            })
            .collect())
    }

    async fn load_lessons(&self, filters: &ReportFilters) -> Result<Vec<FlatRecord>> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT l.lesson_name, c.course_name, l.duration_minutes, l.content, \
             l.lesson_status, l.created_at \
             FROM lessons l LEFT JOIN courses c ON l.course_id = c.id WHERE 1 = 1",
        );
        if let Some(status) = filters.lesson_status {
            query.push(" AND l.lesson_status = ").push_bind(status);
        }
        query.push(" ORDER BY l.created_at, l.lesson_name");
        let rows = query.build().fetch_all(self.db.pool()).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                vec![
                    ("Lesson Name", row.get::<String, _>("lesson_name")),
                    (
                        "Course",
                        row.get::<Option<String>, _>("course_name")
                            .unwrap_or_default(),
                    ),
                    (
                        "Duration (minutes)",
                        row.get::<Option<i32>, _>("duration_minutes")
                            .map(|d| d.to_string())
                            .unwrap_or_default(),
                    ),
                    (
                        "Content",
                        truncate_text(
                            &row.get::<Option<String>, _>("content").unwrap_or_default(),
                        ),
                    ),
                    (
                        "Status",
                        status_label(row.get::<bool, _>("lesson_status")).to_string(),
                    ),
                    ("Created At", long_date(row.get("created_at"))),
                ]
            })
            .collect())
    }

    async fn load_exams(&self, filters: &ReportFilters) -> Result<Vec<FlatRecord>> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT exam_title, exam_type, duration_minutes, total_questions, exam_status, \
             created_at FROM exams WHERE 1 = 1",
        );
        if let Some(status) = filters.exam_status {
            query.push(" AND exam_status = ").push_bind(status);
        }
        query.push(" ORDER BY created_at, exam_title");
        let rows = query.build().fetch_all(self.db.pool()).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                vec![
                    ("Exam Title", row.get::<String, _>("exam_title")),
                    (
                        "Exam Type",
                        row.get::<Option<String>, _>("exam_type")
                            .unwrap_or_default(),
                    ),
                    (
                        "Duration (minutes)",
                        row.get::<Option<i32>, _>("duration_minutes")
                            .map(|d| d.to_string())
                            .unwrap_or_default(),
                    ),
                    (
                        "Total Questions",
                        row.get::<Option<i32>, _>("total_questions")
                            .map(|q| q.to_string())
                            .unwrap_or_default(),
                    ),
                    (
                        "Status",
                        status_label(row.get::<bool, _>("exam_status")).to_string(),
                    ),
                    ("Created At", long_date(row.get("created_at"))),
                ]
            })
            .collect())
    }

    async fn load_blogs(&self, filters: &ReportFilters) -> Result<Vec<FlatRecord>> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT b.title, u.full_name AS author_name, b.blog_status, b.body, b.created_at \
             FROM blogs b LEFT JOIN users u ON b.author_id = u.id WHERE 1 = 1",
        );
        if let Some(status) = &filters.blog_status {
            query.push(" AND b.blog_status = ").push_bind(status.clone());
        }
        query.push(" ORDER BY b.created_at, b.title");
        let rows = query.build().fetch_all(self.db.pool()).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                vec![
                    ("Title", row.get::<String, _>("title")),
                    (
                        "Author",
                        row.get::<Option<String>, _>("author_name")
                            .unwrap_or_default(),
                    ),
                    ("Status", row.get::<String, _>("blog_status")),
                    (
                        "Body",
                        truncate_text(&row.get::<Option<String>, _>("body").unwrap_or_default()),
                    ),
                    ("Created At", long_date(row.get("created_at"))),
                ]
            })
            .collect())
    }

    async fn load_documents(&self, filters: &ReportFilters) -> Result<Vec<FlatRecord>> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT d.document_name, d.document_type, c.course_name, d.file_size_bytes, \
             d.created_at \
             FROM documents d LEFT JOIN courses c ON d.course_id = c.id WHERE 1 = 1",
        );
        if let Some(doc_type) = &filters.document_type {
            query
                .push(" AND d.document_type = ")
                .push_bind(doc_type.clone());
        }
        query.push(" ORDER BY d.created_at, d.document_name");
        let rows = query.build().fetch_all(self.db.pool()).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                vec![
                    ("Document Name", row.get::<String, _>("document_name")),
                    ("Type", row.get::<String, _>("document_type")),
                    (
                        "Course",
                        row.get::<Option<String>, _>("course_name")
                            .unwrap_or_default(),
                    ),
                    (
                        "Size (bytes)",
                        row.get::<Option<i64>, _>("file_size_bytes")
                            .map(|s| s.to_string())
                            .unwrap_or_default(),
                    ),
                    ("Created At", long_date(row.get("created_at"))),
                ]
            })
            .collect())
    }

    async fn load_roadmaps(&self, filters: &ReportFilters) -> Result<Vec<FlatRecord>> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT roadmap_name, target_level, duration_weeks, roadmap_status, description, \
             created_at FROM roadmaps WHERE 1 = 1",
        );
        if let Some(status) = filters.roadmap_status {
            query.push(" AND roadmap_status = ").push_bind(status);
        }
        query.push(" ORDER BY created_at, roadmap_name");
        let rows = query.build().fetch_all(self.db.pool()).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                vec![
                    ("Roadmap Name", row.get::<String, _>("roadmap_name")),
                    (
                        "Target Level",
                        row.get::<Option<String>, _>("target_level")
                            .unwrap_or_default(),
                    ),
                    (
                        "Duration (weeks)",
                        row.get::<Option<i32>, _>("duration_weeks")
                            .map(|w| w.to_string())
                            .unwrap_or_default(),
                    ),
                    (
                        "Status",
                        status_label(row.get::<bool, _>("roadmap_status")).to_string(),
                    ),
                    (
                        "Description",
                        truncate_text(
                            &row.get::<Option<String>, _>("description")
                                .unwrap_or_default(),
                        ),
                    ),
                    ("Created At", long_date(row.get("created_at"))),
                ]
            })
            .collect())
    }
}

fn status_label(active: bool) -> &'static str {
    if active {
        "Active"
    } else {
        "Inactive"
    }
}

/// Long text is cut to a readable preview. Lossy by design; exports
/// are not a backup of the original content.
pub fn truncate_text(text: &str) -> String {
    if text.chars().count() <= TEXT_PREVIEW_LEN {
        return text.to_string();
    }
    let mut preview: String = text.chars().take(TEXT_PREVIEW_LEN).collect();
    preview.push_str("...");
    preview
}

/// Long-form date rendering for export cells, e.g.
/// "Monday, 5 August 2024 14:30". Applied at formatting time, never
/// stored.
pub fn long_date(timestamp: OffsetDateTime) -> String {
    let format = time::macros::format_description!(
        "[weekday], [day padding:none] [month repr:long] [year] [hour]:[minute]"
    );
    timestamp.format(format).unwrap_or_default()
}
