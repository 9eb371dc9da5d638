//! Catalog listing tests
//!
//! Covers the shared pagination/search behavior over courses, exams,
//! and documents.

mod common;

use axum::http::StatusCode;
use common::app;
use std::collections::HashSet;

// ===========================================================================
// Search & filters
// ===========================================================================

#[tokio::test]
async fn course_search_matches_substring_case_insensitively() {
    let app = app().await;
    app.create_course("Grammar Bootcamp CSRCH", "grammar", true)
        .await;
    app.create_course("Listening Drills CSRCH", "listening", true)
        .await;

    let resp = app.get("/v1/courses?search=grammar+bootcamp+csrch").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.success());
    let data = resp.data();
    assert_eq!(data["pagination"]["total"].as_i64().unwrap(), 1);
    assert_eq!(
        data["courses"][0]["course_name"].as_str().unwrap(),
        "Grammar Bootcamp CSRCH"
    );
}

#[tokio::test]
async fn course_status_filter_only_applies_when_present() {
    let app = app().await;
    app.create_course("Status Filter On CSTAT", "reading", true)
        .await;
    app.create_course("Status Filter Off CSTAT", "reading", false)
        .await;

    let resp = app.get("/v1/courses?search=CSTAT").await;
    assert_eq!(resp.data()["pagination"]["total"].as_i64().unwrap(), 2);

    let resp = app.get("/v1/courses?search=CSTAT&course_status=false").await;
    let data = resp.data();
    assert_eq!(data["pagination"]["total"].as_i64().unwrap(), 1);
    assert_eq!(
        data["courses"][0]["course_name"].as_str().unwrap(),
        "Status Filter Off CSTAT"
    );

    // an empty value means "no filter", not "false"
    let resp = app.get("/v1/courses?search=CSTAT&course_status=").await;
    assert_eq!(resp.data()["pagination"]["total"].as_i64().unwrap(), 2);
}

#[tokio::test]
async fn course_bool_filter_rejects_garbage() {
    let app = app().await;
    let resp = app.get("/v1/courses?course_status=maybe").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.message().contains("course_status"));
}

#[tokio::test]
async fn course_skill_filter_rejects_unknown_values() {
    let app = app().await;
    let resp = app.get("/v1/courses?skill_type=karate").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.message(), "invalid skill_type");
}

#[tokio::test]
async fn exam_search_matches_title_only() {
    let app = app().await;
    app.create_exam("TOEIC 2024 Practice", true).await;
    app.create_exam("IELTS Mock", true).await;

    let resp = app.get("/v1/exams?search=TOEIC").await;
    assert_eq!(resp.status, StatusCode::OK);
    let exams = resp.data()["exams"].clone();
    let titles: Vec<&str> = exams
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["exam_title"].as_str().unwrap())
        .collect();

    assert!(titles.contains(&"TOEIC 2024 Practice"));
    assert!(titles.iter().all(|t| t.contains("TOEIC")));
    assert!(!titles.contains(&"IELTS Mock"));
}

#[tokio::test]
async fn document_type_filter() {
    let app = app().await;
    app.create_document("Doc Filter PDF DTYP", "pdf", None).await;
    app.create_document("Doc Filter Video DTYP", "video", None)
        .await;

    let resp = app.get("/v1/documents?search=DTYP&document_type=pdf").await;
    let data = resp.data();
    assert_eq!(data["pagination"]["total"].as_i64().unwrap(), 1);
    assert_eq!(
        data["documents"][0]["document_name"].as_str().unwrap(),
        "Doc Filter PDF DTYP"
    );

    let resp = app.get("/v1/documents?document_type=spreadsheet").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn document_listing_joins_course_name() {
    let app = app().await;
    let course_id = app
        .create_course("Joined Course DJOIN", "writing", true)
        .await;
    app.create_document("Doc With Course DJOIN", "slide", Some(course_id))
        .await;
    app.create_document("Doc Without Course DJOIN", "slide", None)
        .await;

    let resp = app.get("/v1/documents?search=DJOIN").await;
    let docs = resp.data()["documents"].clone();
    let docs = docs.as_array().unwrap();
    assert_eq!(docs.len(), 2);

    for doc in docs {
        match doc["document_name"].as_str().unwrap() {
            "Doc With Course DJOIN" => {
                assert_eq!(doc["course_name"].as_str().unwrap(), "Joined Course DJOIN")
            }
            "Doc Without Course DJOIN" => assert!(doc["course_name"].is_null()),
            other => panic!("unexpected document {}", other),
        }
    }
}

// ===========================================================================
// Pagination
// ===========================================================================

#[tokio::test]
async fn pagination_walk_yields_every_row_exactly_once() {
    let app = app().await;
    for i in 0..25 {
        app.create_document(&format!("Paged Doc PGWALK {:02}", i), "pdf", None)
            .await;
    }

    let first = app.get("/v1/documents?search=PGWALK&limit=10&page=1").await;
    let total_pages = first.data()["pagination"]["total_pages"].as_i64().unwrap();
    assert_eq!(first.data()["pagination"]["total"].as_i64().unwrap(), 25);
    assert_eq!(total_pages, 3);

    let mut seen = HashSet::new();
    for page in 1..=total_pages {
        let resp = app
            .get(&format!("/v1/documents?search=PGWALK&limit=10&page={}", page))
            .await;
        for doc in resp.data()["documents"].as_array().unwrap() {
            // no duplicates across pages
            assert!(seen.insert(doc["id"].as_str().unwrap().to_string()));
        }
    }
    assert_eq!(seen.len(), 25);
}

#[tokio::test]
async fn limit_is_capped_and_defaults_apply() {
    let app = app().await;

    let resp = app.get("/v1/courses?limit=100000").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["pagination"]["limit"].as_i64().unwrap(), 100);

    let resp = app.get("/v1/courses?page=0&limit=-3").await;
    assert_eq!(resp.status, StatusCode::OK);
    let data = resp.data();
    assert_eq!(data["pagination"]["page"].as_i64().unwrap(), 1);
    assert_eq!(data["pagination"]["limit"].as_i64().unwrap(), 10);
}

#[tokio::test]
async fn non_numeric_pagination_params_are_rejected() {
    let app = app().await;
    let resp = app.get("/v1/courses?page=abc").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app.get("/v1/exams?limit=ten").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_page_beyond_the_end() {
    let app = app().await;
    app.create_exam("Beyond End EXBEY", true).await;

    let resp = app.get("/v1/exams?search=EXBEY&page=99").await;
    assert_eq!(resp.status, StatusCode::OK);
    let data = resp.data();
    assert_eq!(data["exams"].as_array().unwrap().len(), 0);
    assert_eq!(data["pagination"]["total"].as_i64().unwrap(), 1);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = app().await;
    let resp = app.get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["status"].as_str().unwrap(), "ok");
}
