use anyhow::Result;
use sqlx::{Postgres, QueryBuilder, Row};

use crate::app::pagination::{contains_pattern, PageParams};
use crate::domain::course::{Course, SkillType};
use crate::domain::document::{Document, DocumentType};
use crate::domain::exam::Exam;
use crate::infra::db::Db;

/// List/search services for the catalog entities. Each listing shares
/// the same shape: optional free-text search over the entity's text
/// columns, optional status/type filters applied only when present,
/// and a stable created_at/id ordering so pages never overlap.
#[derive(Clone)]
pub struct CatalogService {
    db: Db,
}

impl CatalogService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn list_courses(
        &self,
        params: PageParams,
        search: Option<&str>,
        course_status: Option<bool>,
        skill_type: Option<SkillType>,
    ) -> Result<(Vec<Course>, i64)> {
        let push_filters = |qb: &mut QueryBuilder<Postgres>| {
            qb.push(" WHERE 1 = 1");
            if let Some(query) = search.filter(|q| !q.is_empty()) {
                let pattern = contains_pattern(query);
                qb.push(" AND (course_name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" ESCAPE '\\' OR description ILIKE ")
                    .push_bind(pattern)
                    .push(" ESCAPE '\\')");
            }
            if let Some(status) = course_status {
                qb.push(" AND course_status = ").push_bind(status);
            }
            if let Some(skill) = skill_type {
                qb.push(" AND skill_type = ").push_bind(skill.as_db());
            }
        };

        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM courses");
        push_filters(&mut count_query);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.db.pool())
            .await?;

        let mut rows_query = QueryBuilder::new(
            "SELECT id, course_name, description, skill_type, level, course_status, created_at \
             FROM courses",
        );
        push_filters(&mut rows_query);
        rows_query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(params.limit)
            .push(" OFFSET ")
            .push_bind(params.offset());
        let rows = rows_query.build().fetch_all(self.db.pool()).await?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in rows {
            let skill: String = row.get("skill_type");
            let skill = SkillType::from_db(&skill)
                .ok_or_else(|| anyhow::anyhow!("unknown skill type: {}", skill))?;
            courses.push(Course {
                id: row.get("id"),
                course_name: row.get("course_name"),
                description: row.get("description"),
                skill_type: skill,
                level: row.get("level"),
                course_status: row.get("course_status"),
                created_at: row.get("created_at"),
            });
        }

        Ok((courses, total))
    }

    pub async fn list_exams(
        &self,
        params: PageParams,
        search: Option<&str>,
        exam_status: Option<bool>,
    ) -> Result<(Vec<Exam>, i64)> {
        let push_filters = |qb: &mut QueryBuilder<Postgres>| {
            qb.push(" WHERE 1 = 1");
            if let Some(query) = search.filter(|q| !q.is_empty()) {
                qb.push(" AND exam_title ILIKE ")
                    .push_bind(contains_pattern(query))
                    .push(" ESCAPE '\\'");
            }
            if let Some(status) = exam_status {
                qb.push(" AND exam_status = ").push_bind(status);
            }
        };

        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM exams");
        push_filters(&mut count_query);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.db.pool())
            .await?;

        let mut rows_query = QueryBuilder::new(
            "SELECT id, exam_title, exam_type, duration_minutes, total_questions, exam_status, \
             created_at FROM exams",
        );
        push_filters(&mut rows_query);
        rows_query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(params.limit)
            .push(" OFFSET ")
            .push_bind(params.offset());
        let rows = rows_query.build().fetch_all(self.db.pool()).await?;

        let exams = rows
            .into_iter()
            .map(|row| Exam {
                id: row.get("id"),
                exam_title: row.get("exam_title"),
                exam_type: row.get("exam_type"),
                duration_minutes: row.get("duration_minutes"),
                total_questions: row.get("total_questions"),
                exam_status: row.get("exam_status"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok((exams, total))
    }

    pub async fn list_documents(
        &self,
        params: PageParams,
        search: Option<&str>,
        document_type: Option<DocumentType>,
    ) -> Result<(Vec<Document>, i64)> {
        let push_filters = |qb: &mut QueryBuilder<Postgres>| {
            qb.push(" WHERE 1 = 1");
            if let Some(query) = search.filter(|q| !q.is_empty()) {
                qb.push(" AND d.document_name ILIKE ")
                    .push_bind(contains_pattern(query))
                    .push(" ESCAPE '\\'");
            }
            if let Some(doc_type) = document_type {
                qb.push(" AND d.document_type = ").push_bind(doc_type.as_db());
            }
        };

        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM documents d");
        push_filters(&mut count_query);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.db.pool())
            .await?;

        let mut rows_query = QueryBuilder::new(
            "SELECT d.id, d.document_name, d.document_type, d.course_id, c.course_name, \
             d.file_size_bytes, d.created_at \
             FROM documents d LEFT JOIN courses c ON d.course_id = c.id",
        );
        push_filters(&mut rows_query);
        rows_query
            .push(" ORDER BY d.created_at DESC, d.id DESC LIMIT ")
            .push_bind(params.limit)
            .push(" OFFSET ")
            .push_bind(params.offset());
        let rows = rows_query.build().fetch_all(self.db.pool()).await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let doc_type: String = row.get("document_type");
            let doc_type = DocumentType::from_db(&doc_type)
                .ok_or_else(|| anyhow::anyhow!("unknown document type: {}", doc_type))?;
            documents.push(Document {
                id: row.get("id"),
                document_name: row.get("document_name"),
                document_type: doc_type,
                course_id: row.get("course_id"),
                course_name: row.get("course_name"),
                file_size_bytes: row.get("file_size_bytes"),
                created_at: row.get("created_at"),
            });
        }

        Ok((documents, total))
    }
}
