//! Report pipeline tests
//!
//! Covers generation for every report type, the exported file layout,
//! download, deletion, and the report listing.

mod common;

use axum::http::StatusCode;
use common::app;
use serde_json::json;
use std::path::Path;
use uuid::Uuid;

// ===========================================================================
// Generation
// ===========================================================================

#[tokio::test]
async fn generate_users_report_counts_filtered_rows() {
    let app = app().await;
    app.create_user("rep_inactive_1", false).await;
    app.create_user("rep_inactive_2", false).await;
    app.create_user("rep_inactive_3", false).await;
    app.create_user("rep_active_1", true).await;

    let resp = app
        .post_json(
            "/v1/reports",
            json!({
                "report_name": "Inactive Users",
                "report_type": "users",
                "file_format": "csv",
                "filters": {"user_status": false}
            }),
            Some(Uuid::new_v4()),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    assert!(resp.success());
    let report = &resp.data()["report"];
    assert_eq!(report["report_type"].as_str().unwrap(), "users");

    let file_path = report["file_path"].as_str().unwrap().to_string();
    let content = std::fs::read_to_string(&file_path).expect("report file missing");
    // 4 metadata rows + blank + header + one row per matching user
    assert_eq!(content.lines().count(), 6 + 3);
    assert!(content.contains("Total Records,3"));
    assert!(content.contains("Inactive Users"));
}

#[tokio::test]
async fn generate_succeeds_for_every_report_type() {
    let app = app().await;
    let operator = Uuid::new_v4();

    for report_type in [
        "users",
        "courses",
        "lessons",
        "exams",
        "blogs",
        "documents",
        "roadmaps",
    ] {
        let resp = app
            .post_json(
                "/v1/reports",
                json!({
                    "report_name": format!("Snapshot {}", report_type),
                    "report_type": report_type,
                    "file_format": "csv"
                }),
                Some(operator),
            )
            .await;

        assert_eq!(resp.status, StatusCode::CREATED, "type {}", report_type);
        let file_path = resp.data()["report"]["file_path"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(
            Path::new(&file_path).exists(),
            "no file for {}",
            report_type
        );
        assert!(file_path.ends_with(".csv"));
    }
}

#[tokio::test]
async fn unsupported_report_type_creates_nothing() {
    let app = app().await;

    let resp = app
        .post_json(
            "/v1/reports",
            json!({
                "report_name": "Invoices Report Q3",
                "report_type": "invoices"
            }),
            Some(Uuid::new_v4()),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(!resp.success());
    assert_eq!(resp.message(), "invalid report_type");

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE report_name = $1")
            .bind("Invoices Report Q3")
            .fetch_one(app.pool())
            .await
            .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn empty_report_has_only_metadata_rows() {
    let app = app().await;

    // nothing seeds inactive lessons, so this filter matches zero rows
    let resp = app
        .post_json(
            "/v1/reports",
            json!({
                "report_name": "Retired Lessons",
                "report_type": "lessons",
                "file_format": "csv",
                "filters": {"lesson_status": false}
            }),
            Some(Uuid::new_v4()),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let file_path = resp.data()["report"]["file_path"]
        .as_str()
        .unwrap()
        .to_string();
    let content = std::fs::read_to_string(&file_path).unwrap();
    assert_eq!(content.lines().count(), 5);
    assert!(content.contains("Total Records,0"));
}

#[tokio::test]
async fn missing_related_entity_renders_empty_string() {
    let app = app().await;
    app.create_lesson("Orphan Lesson MKR77", None, true).await;

    let resp = app
        .post_json(
            "/v1/reports",
            json!({
                "report_name": "All Lessons",
                "report_type": "lessons",
                "file_format": "csv"
            }),
            Some(Uuid::new_v4()),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let file_path = resp.data()["report"]["file_path"]
        .as_str()
        .unwrap()
        .to_string();
    let content = std::fs::read_to_string(&file_path).unwrap();

    let line = content
        .lines()
        .find(|l| l.starts_with("Orphan Lesson MKR77"))
        .expect("seeded lesson not in export");
    // course column is empty, not the text "null"
    assert!(line.starts_with("Orphan Lesson MKR77,,45,"));
    assert!(!content.contains("null"));
}

#[tokio::test]
async fn excel_report_is_a_real_workbook() {
    let app = app().await;
    app.create_roadmap("Roadmap XLSX A", true).await;
    app.create_roadmap("Roadmap XLSX B", true).await;

    let resp = app
        .post_json(
            "/v1/reports",
            json!({
                "report_name": "Roadmaps Snapshot",
                "report_type": "roadmaps"
            }),
            Some(Uuid::new_v4()),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let report = &resp.data()["report"];
    // excel is the default format
    assert_eq!(report["file_format"].as_str().unwrap(), "excel");
    let file_path = report["file_path"].as_str().unwrap().to_string();
    assert!(file_path.ends_with(".xlsx"));

    let bytes = std::fs::read(&file_path).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn create_report_requires_user_context() {
    let app = app().await;

    let resp = app
        .post_json(
            "/v1/reports",
            json!({"report_name": "No User", "report_type": "users"}),
            None,
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.message(), "missing x-user-id header");
}

#[tokio::test]
async fn blank_report_name_rejected() {
    let app = app().await;

    let resp = app
        .post_json(
            "/v1/reports",
            json!({"report_name": "   ", "report_type": "users"}),
            Some(Uuid::new_v4()),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.message(), "report_name is required");
}

#[tokio::test]
async fn invalid_filter_values_rejected() {
    let app = app().await;

    let resp = app
        .post_json(
            "/v1/reports",
            json!({
                "report_name": "Bad Filter",
                "report_type": "blogs",
                "filters": {"blog_status": "archived"}
            }),
            Some(Uuid::new_v4()),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.message(), "invalid blog_status filter");
}

// ===========================================================================
// Retrieval, download, deletion
// ===========================================================================

#[tokio::test]
async fn get_report_by_id_returns_metadata() {
    let app = app().await;
    let operator = Uuid::new_v4();

    let created = app
        .post_json(
            "/v1/reports",
            json!({
                "report_name": "Metadata Check",
                "report_type": "exams",
                "file_format": "csv",
                "report_content": "weekly snapshot",
                "filters": {"exam_status": true}
            }),
            Some(operator),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.data()["report"]["id"].as_str().unwrap().to_string();

    let resp = app.get(&format!("/v1/reports/{}", id)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let report = &resp.data()["report"];
    assert_eq!(report["report_name"].as_str().unwrap(), "Metadata Check");
    assert_eq!(report["report_content"].as_str().unwrap(), "weekly snapshot");
    assert_eq!(report["created_by"].as_str().unwrap(), operator.to_string());
    // the filter snapshot is stored verbatim
    assert_eq!(report["filters"]["exam_status"], json!(true));
}

#[tokio::test]
async fn get_unknown_report_is_not_found() {
    let app = app().await;
    let resp = app.get(&format!("/v1/reports/{}", Uuid::new_v4())).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(!resp.success());
}

#[tokio::test]
async fn download_streams_the_stored_file() {
    let app = app().await;
    app.create_course("Download Course MKR", "reading", false)
        .await;

    let created = app
        .post_json(
            "/v1/reports",
            json!({
                "report_name": "Download Check",
                "report_type": "courses",
                "file_format": "csv",
                "filters": {"course_status": false}
            }),
            Some(Uuid::new_v4()),
        )
        .await;
    let id = created.data()["report"]["id"].as_str().unwrap().to_string();

    let resp = app.get(&format!("/v1/reports/{}/download", id)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.body_text();
    assert!(body.starts_with("Download Check"));
    assert!(body.contains("Download Course MKR"));
}

#[tokio::test]
async fn download_unknown_report_is_not_found() {
    let app = app().await;
    let resp = app
        .get(&format!("/v1/reports/{}/download", Uuid::new_v4()))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.message(), "report not found");
}

#[tokio::test]
async fn download_with_missing_file_reports_it() {
    let app = app().await;

    let created = app
        .post_json(
            "/v1/reports",
            json!({
                "report_name": "Vanished File",
                "report_type": "blogs",
                "file_format": "csv",
                "filters": {"blog_status": "draft"}
            }),
            Some(Uuid::new_v4()),
        )
        .await;
    let report = created.data()["report"].clone();
    let id = report["id"].as_str().unwrap().to_string();
    let file_path = report["file_path"].as_str().unwrap().to_string();

    std::fs::remove_file(&file_path).unwrap();

    let resp = app.get(&format!("/v1/reports/{}/download", id)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.message(), "report file is no longer available");
}

#[tokio::test]
async fn delete_removes_row_and_file() {
    let app = app().await;

    let created = app
        .post_json(
            "/v1/reports",
            json!({
                "report_name": "Doomed Report",
                "report_type": "exams",
                "file_format": "csv",
                "filters": {"exam_status": false}
            }),
            Some(Uuid::new_v4()),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let report = created.data()["report"].clone();
    let id = report["id"].as_str().unwrap().to_string();
    let file_path = report["file_path"].as_str().unwrap().to_string();
    assert!(Path::new(&file_path).exists());

    let resp = app.delete(&format!("/v1/reports/{}", id)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.success());

    let resp = app.get(&format!("/v1/reports/{}", id)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(!Path::new(&file_path).exists());
}

#[tokio::test]
async fn delete_unknown_report_is_not_found() {
    let app = app().await;
    let resp = app.delete(&format!("/v1/reports/{}", Uuid::new_v4())).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

// ===========================================================================
// Listing
// ===========================================================================

#[tokio::test]
async fn list_reports_paginates_and_sorts() {
    let app = app().await;
    let operator = Uuid::new_v4();

    for i in 1..=5 {
        let resp = app
            .post_json(
                "/v1/reports",
                json!({
                    "report_name": format!("ListMarker {:02}", i),
                    "report_type": "roadmaps",
                    "file_format": "csv",
                    "filters": {"roadmap_status": false}
                }),
                Some(operator),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
    }

    let mut seen = std::collections::HashSet::new();
    for page in 1..=3 {
        let resp = app
            .get(&format!(
                "/v1/reports?search=ListMarker&limit=2&page={}",
                page
            ))
            .await;
        assert_eq!(resp.status, StatusCode::OK);
        let data = resp.data();
        assert_eq!(data["pagination"]["total"].as_i64().unwrap(), 5);
        assert_eq!(data["pagination"]["total_pages"].as_i64().unwrap(), 3);
        for report in data["reports"].as_array().unwrap() {
            seen.insert(report["id"].as_str().unwrap().to_string());
        }
    }
    assert_eq!(seen.len(), 5);

    let resp = app
        .get("/v1/reports?search=ListMarker&sort_by=report_name&order=asc&limit=1")
        .await;
    let data = resp.data();
    assert_eq!(
        data["reports"][0]["report_name"].as_str().unwrap(),
        "ListMarker 01"
    );
}

#[tokio::test]
async fn list_reports_rejects_unknown_sort_field() {
    let app = app().await;
    let resp = app.get("/v1/reports?sort_by=file_path").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.message(), "invalid sort_by");

    let resp = app.get("/v1/reports?order=sideways").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.message(), "invalid order");
}

#[tokio::test]
async fn list_reports_rejects_unknown_type_filter() {
    let app = app().await;
    let resp = app.get("/v1/reports?report_type=certificates").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.message(), "invalid report_type");
}
