use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::catalog::CatalogService;
use crate::app::pagination::{PageParams, Pagination};
use crate::app::reports::{Download, NewReport, ReportService};
use crate::domain::course::{Course, SkillType};
use crate::domain::document::{Document, DocumentType};
use crate::domain::exam::Exam;
use crate::domain::report::{Report, ReportFilters, ReportFormat, ReportSort, ReportType, SortOrder};
use crate::http::{AdminUser, AppError};
use crate::AppState;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    fn message_only(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: None,
        })
    }
}

/// Boolean query/filter parameters arrive as the literal strings
/// "true"/"false". An empty string means the client sent the key
/// without a value, which counts as "no filter".
fn parse_bool_param(value: Option<&str>, name: &str) -> Result<Option<bool>, AppError> {
    match value {
        None => Ok(None),
        Some("") => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(_) => Err(AppError::bad_request(format!(
            "{} must be \"true\" or \"false\"",
            name
        ))),
    }
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse { status })
}

// ---------------------------------------------------------------------------
// Catalog listings
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CourseListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub course_status: Option<String>,
    pub skill_type: Option<String>,
}

#[derive(Serialize)]
pub struct CourseListData {
    pub courses: Vec<Course>,
    pub pagination: Pagination,
}

pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CourseListQuery>,
) -> Result<Json<ApiResponse<CourseListData>>, AppError> {
    let params = PageParams::new(query.page, query.limit);
    let course_status = parse_bool_param(query.course_status.as_deref(), "course_status")?;
    let skill_type = match query.skill_type.as_deref() {
        None | Some("") => None,
        Some(value) => Some(
            SkillType::from_db(value).ok_or_else(|| AppError::bad_request("invalid skill_type"))?,
        ),
    };

    let service = CatalogService::new(state.db.clone());
    let (courses, total) = service
        .list_courses(params, query.search.as_deref(), course_status, skill_type)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to list courses");
            AppError::internal("failed to list courses")
        })?;

    Ok(ApiResponse::ok(
        "courses retrieved",
        CourseListData {
            courses,
            pagination: Pagination::new(total, params),
        },
    ))
}

#[derive(Deserialize)]
pub struct ExamListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub exam_status: Option<String>,
}

#[derive(Serialize)]
pub struct ExamListData {
    pub exams: Vec<Exam>,
    pub pagination: Pagination,
}

pub async fn list_exams(
    State(state): State<AppState>,
    Query(query): Query<ExamListQuery>,
) -> Result<Json<ApiResponse<ExamListData>>, AppError> {
    let params = PageParams::new(query.page, query.limit);
    let exam_status = parse_bool_param(query.exam_status.as_deref(), "exam_status")?;

    let service = CatalogService::new(state.db.clone());
    let (exams, total) = service
        .list_exams(params, query.search.as_deref(), exam_status)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to list exams");
            AppError::internal("failed to list exams")
        })?;

    Ok(ApiResponse::ok(
        "exams retrieved",
        ExamListData {
            exams,
            pagination: Pagination::new(total, params),
        },
    ))
}

#[derive(Deserialize)]
pub struct DocumentListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub document_type: Option<String>,
}

#[derive(Serialize)]
pub struct DocumentListData {
    pub documents: Vec<Document>,
    pub pagination: Pagination,
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<DocumentListQuery>,
) -> Result<Json<ApiResponse<DocumentListData>>, AppError> {
    let params = PageParams::new(query.page, query.limit);
    let document_type = match query.document_type.as_deref() {
        None | Some("") => None,
        Some(value) => Some(
            DocumentType::from_db(value)
                .ok_or_else(|| AppError::bad_request("invalid document_type"))?,
        ),
    };

    let service = CatalogService::new(state.db.clone());
    let (documents, total) = service
        .list_documents(params, query.search.as_deref(), document_type)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to list documents");
            AppError::internal("failed to list documents")
        })?;

    Ok(ApiResponse::ok(
        "documents retrieved",
        DocumentListData {
            documents,
            pagination: Pagination::new(total, params),
        },
    ))
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct ReportListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub report_type: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Serialize)]
pub struct ReportListData {
    pub reports: Vec<Report>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
pub struct ReportData {
    pub report: Report,
}

pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportListQuery>,
) -> Result<Json<ApiResponse<ReportListData>>, AppError> {
    let params = PageParams::new(query.page, query.limit);
    let report_type = match query.report_type.as_deref() {
        None | Some("") => None,
        Some(value) => Some(
            ReportType::from_db(value)
                .ok_or_else(|| AppError::bad_request("invalid report_type"))?,
        ),
    };
    let sort = ReportSort::from_param(query.sort_by.as_deref().unwrap_or("created_at"))
        .ok_or_else(|| AppError::bad_request("invalid sort_by"))?;
    let order = SortOrder::from_param(query.order.as_deref().unwrap_or("desc"))
        .ok_or_else(|| AppError::bad_request("invalid order"))?;

    let service = ReportService::new(state.db.clone(), state.reports_dir.clone());
    let (reports, total) = service
        .get_paginated(params, query.search.as_deref(), report_type, sort, order)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to list reports");
            AppError::internal("failed to list reports")
        })?;

    Ok(ApiResponse::ok(
        "reports retrieved",
        ReportListData {
            reports,
            pagination: Pagination::new(total, params),
        },
    ))
}

#[derive(Deserialize)]
pub struct CreateReportRequest {
    pub report_name: String,
    pub report_type: String,
    pub file_format: Option<String>,
    pub report_content: Option<String>,
    pub filters: Option<ReportFilters>,
}

pub async fn create_report(
    State(state): State<AppState>,
    user: AdminUser,
    Json(payload): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReportData>>), AppError> {
    if payload.report_name.trim().is_empty() {
        return Err(AppError::bad_request("report_name is required"));
    }
    let report_type = ReportType::from_db(&payload.report_type)
        .ok_or_else(|| AppError::bad_request("invalid report_type"))?;
    let file_format = match payload.file_format.as_deref() {
        None | Some("") => ReportFormat::Excel,
        Some(value) => ReportFormat::from_db(value)
            .ok_or_else(|| AppError::bad_request("invalid file_format"))?,
    };
    let filters = payload.filters.unwrap_or_default();
    validate_filters(&filters)?;

    let service = ReportService::new(state.db.clone(), state.reports_dir.clone());
    let report = service
        .generate(NewReport {
            report_name: payload.report_name,
            report_type,
            file_format,
            report_content: payload.report_content,
            filters,
            created_by: user.user_id,
        })
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to generate report");
            AppError::internal("failed to generate report")
        })?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("report generated", ReportData { report }),
    ))
}

fn validate_filters(filters: &ReportFilters) -> Result<(), AppError> {
    if let Some(blog_status) = filters.blog_status.as_deref() {
        if !matches!(blog_status, "draft" | "published") {
            return Err(AppError::bad_request("invalid blog_status filter"));
        }
    }
    if let Some(document_type) = filters.document_type.as_deref() {
        if DocumentType::from_db(document_type).is_none() {
            return Err(AppError::bad_request("invalid document_type filter"));
        }
    }
    Ok(())
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportData>>, AppError> {
    let service = ReportService::new(state.db.clone(), state.reports_dir.clone());
    let report = service.get_by_id(id).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to load report");
        AppError::internal("failed to load report")
    })?;

    match report {
        Some(report) => Ok(ApiResponse::ok("report retrieved", ReportData { report })),
        None => Err(AppError::not_found("report not found")),
    }
}

pub async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let service = ReportService::new(state.db.clone(), state.reports_dir.clone());
    let deleted = service.delete(id).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to delete report");
        AppError::internal("failed to delete report")
    })?;

    if deleted {
        Ok(ApiResponse::message_only("report deleted"))
    } else {
        Err(AppError::not_found("report not found"))
    }
}

pub async fn download_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let service = ReportService::new(state.db.clone(), state.reports_dir.clone());
    let download = service.download(id).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to download report");
        AppError::internal("failed to download report")
    })?;

    match download {
        Download::Ready(file) => {
            let disposition = format!("attachment; filename=\"{}\"", file.file_name);
            Ok((
                [
                    (header::CONTENT_TYPE, file.content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                file.bytes,
            )
                .into_response())
        }
        Download::NotFound => Err(AppError::not_found("report not found")),
        Download::FileMissing => Err(AppError::not_found("report file is no longer available")),
    }
}
