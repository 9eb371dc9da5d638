use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::app::exporter::WorkbookExporter;
use crate::app::formatter::ReportFormatter;
use crate::app::pagination::{contains_pattern, PageParams};
use crate::domain::report::{
    Report, ReportFilters, ReportFormat, ReportSort, ReportType, SortOrder,
};
use crate::infra::db::Db;

const REPORT_COLUMNS: &str = "id, report_name, report_type, report_content, file_path, \
                              file_format, filters, created_by, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewReport {
    pub report_name: String,
    pub report_type: ReportType,
    pub file_format: ReportFormat,
    pub report_content: Option<String>,
    pub filters: ReportFilters,
    pub created_by: Uuid,
}

#[derive(Debug)]
pub struct ReportDownload {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub enum Download {
    Ready(ReportDownload),
    /// No row, or the row never got a file path.
    NotFound,
    /// The row exists but its file is gone from disk.
    FileMissing,
}

#[derive(Clone)]
pub struct ReportService {
    db: Db,
    formatter: ReportFormatter,
    exporter: WorkbookExporter,
}

impl ReportService {
    pub fn new(db: Db, reports_dir: PathBuf) -> Self {
        Self {
            formatter: ReportFormatter::new(db.clone()),
            exporter: WorkbookExporter::new(reports_dir),
            db,
        }
    }

    /// Format, export, then persist the metadata row. The row insert
    /// is the commit point: if it fails after the file was written,
    /// the orphan file is removed best-effort before the error
    /// surfaces.
    pub async fn generate(&self, new: NewReport) -> Result<Report> {
        let records = self.formatter.load(new.report_type, &new.filters).await?;
        let exported =
            self.exporter
                .export(&records, &new.report_name, new.report_type, new.file_format)?;

        let filters = serde_json::to_value(&new.filters)?;
        let insert = sqlx::query(&format!(
            "INSERT INTO reports \
             (report_name, report_type, report_content, file_path, file_format, filters, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {REPORT_COLUMNS}"
        ))
        .bind(&new.report_name)
        .bind(new.report_type.as_db())
        .bind(&new.report_content)
        .bind(&exported.file_path)
        .bind(new.file_format.as_db())
        .bind(&filters)
        .bind(new.created_by)
        .fetch_one(self.db.pool())
        .await;

        let row = match insert {
            Ok(row) => row,
            Err(err) => {
                if let Err(remove_err) = std::fs::remove_file(&exported.file_path) {
                    tracing::warn!(
                        file_path = %exported.file_path,
                        error = %remove_err,
                        "failed to remove orphan report file after insert failure"
                    );
                }
                return Err(err.into());
            }
        };

        tracing::info!(
            report_type = new.report_type.as_db(),
            file_name = %exported.file_name,
            records = records.len(),
            "report generated"
        );

        report_from_row(&row)
    }

    pub async fn get_paginated(
        &self,
        params: PageParams,
        search: Option<&str>,
        report_type: Option<ReportType>,
        sort: ReportSort,
        order: SortOrder,
    ) -> Result<(Vec<Report>, i64)> {
        let push_filters = |qb: &mut QueryBuilder<Postgres>| {
            qb.push(" WHERE 1 = 1");
            if let Some(query) = search.filter(|q| !q.is_empty()) {
                qb.push(" AND report_name ILIKE ")
                    .push_bind(contains_pattern(query))
                    .push(" ESCAPE '\\'");
            }
            if let Some(report_type) = report_type {
                qb.push(" AND report_type = ").push_bind(report_type.as_db());
            }
        };

        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM reports");
        push_filters(&mut count_query);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(self.db.pool())
            .await?;

        let mut rows_query =
            QueryBuilder::new(format!("SELECT {REPORT_COLUMNS} FROM reports"));
        push_filters(&mut rows_query);
        // sort column and direction come from allow-listed enums, not
        // raw caller input
        rows_query.push(format!(
            " ORDER BY {} {}, id DESC LIMIT ",
            sort.as_column(),
            order.as_sql()
        ));
        rows_query
            .push_bind(params.limit)
            .push(" OFFSET ")
            .push_bind(params.offset());
        let rows = rows_query.build().fetch_all(self.db.pool()).await?;

        let mut reports = Vec::with_capacity(rows.len());
        for row in rows {
            reports.push(report_from_row(&row)?);
        }

        Ok((reports, total))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        let row = sqlx::query(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|row| report_from_row(&row)).transpose()
    }

    /// Remove the metadata row, then the backing file. The row delete
    /// is the commit point, so a concurrent delete of the same report
    /// resolves to not-found for the loser. A file that is already
    /// gone counts as clean; any other file error is logged for a
    /// cleanup sweep and does not fail the delete.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let row = sqlx::query("DELETE FROM reports WHERE id = $1 RETURNING file_path")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        let Some(row) = row else {
            return Ok(false);
        };

        if let Some(file_path) = row.get::<Option<String>, _>("file_path") {
            match std::fs::remove_file(&file_path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    tracing::warn!(
                        file_path = %file_path,
                        error = %err,
                        "failed to delete report file; leaving for cleanup"
                    );
                }
            }
        }

        Ok(true)
    }

    pub async fn download(&self, id: Uuid) -> Result<Download> {
        let Some(report) = self.get_by_id(id).await? else {
            return Ok(Download::NotFound);
        };
        let Some(file_path) = report.file_path.as_deref() else {
            return Ok(Download::NotFound);
        };

        let bytes = match tokio::fs::read(file_path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Download::FileMissing);
            }
            Err(err) => return Err(err.into()),
        };

        let file_name = Path::new(file_path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_path.to_string());

        Ok(Download::Ready(ReportDownload {
            file_name,
            content_type: report.file_format.content_type(),
            bytes,
        }))
    }
}

fn report_from_row(row: &PgRow) -> Result<Report> {
    let report_type: String = row.get("report_type");
    let report_type = ReportType::from_db(&report_type)
        .ok_or_else(|| anyhow::anyhow!("unknown report type: {}", report_type))?;
    let file_format: String = row.get("file_format");
    let file_format = ReportFormat::from_db(&file_format)
        .ok_or_else(|| anyhow::anyhow!("unknown report format: {}", file_format))?;

    Ok(Report {
        id: row.get("id"),
        report_name: row.get("report_name"),
        report_type,
        report_content: row.get("report_content"),
        file_path: row.get("file_path"),
        file_format,
        filters: row.get("filters"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
