//! HTTP-level tests for the `/api/v1/tasks` resource.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_task, delete_as, get, get_as, post_json_as, put_json_as};
use serde_json::json;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_user_header_is_unauthorized() {
    let app = common::build_test_app();
    let response = get(&app, "/api/v1/tasks").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_returns_201_with_owned_task() {
    let app = common::build_test_app();
    let response = post_json_as(
        &app,
        "u1",
        "/api/v1/tasks",
        json!({
            "title": "Write report",
            "description": "Quarterly numbers",
            "due_date": "2024-03-31",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let task = &json["data"];
    assert_eq!(task["user_id"], "u1");
    assert_eq!(task["title"], "Write report");
    assert_eq!(task["completed"], false);
    assert_eq!(task["is_public"], false);
    assert_eq!(task["due_date"], "2024-03-31");
    assert!(task["attachment"].is_null());
}

#[tokio::test]
async fn create_rejects_blank_title() {
    let app = common::build_test_app();
    for title in ["", "   "] {
        let response = post_json_as(
            &app,
            "u1",
            "/api/v1/tasks",
            json!({ "title": title, "description": "d", "due_date": "2024-03-31" }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn malformed_body_fields_are_validation_errors() {
    let app = common::build_test_app();
    let bodies = [
        json!({ "title": "A", "description": "d", "due_date": "31/12/2024" }),
        json!({ "title": 5, "description": "d", "due_date": "2024-03-31" }),
        json!({ "description": "d", "due_date": "2024-03-31" }),
    ];

    for body in bodies {
        let response = post_json_as(&app, "u1", "/api/v1/tasks", body).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert!(json["error"].is_string());
    }
}

#[tokio::test]
async fn malformed_update_and_path_are_validation_errors() {
    let app = common::build_test_app();
    let id = create_task(&app, "u1", "A", false).await;

    let bad_type = put_json_as(
        &app,
        "u1",
        &format!("/api/v1/tasks/{id}"),
        json!({ "completed": "yes" }),
    )
    .await;
    assert_eq!(bad_type.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(bad_type).await["code"], "VALIDATION_ERROR");

    let bad_id = get_as(&app, "u1", "/api/v1/tasks/not-a-number").await;
    assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(bad_id).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Read & visibility
// ---------------------------------------------------------------------------

#[tokio::test]
async fn private_task_is_hidden_from_other_users() {
    let app = common::build_test_app();
    let id = create_task(&app, "u1", "Private", false).await;

    let own = get_as(&app, "u1", &format!("/api/v1/tasks/{id}")).await;
    assert_eq!(own.status(), StatusCode::OK);

    let foreign = get_as(&app, "u2", &format!("/api/v1/tasks/{id}")).await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(foreign).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn publishing_makes_task_readable_but_not_writable() {
    let app = common::build_test_app();
    let id = create_task(&app, "u1", "Shared", false).await;
    let uri = format!("/api/v1/tasks/{id}");

    let published = put_json_as(&app, "u1", &uri, json!({ "is_public": true })).await;
    assert_eq!(published.status(), StatusCode::OK);

    assert_eq!(get_as(&app, "u2", &uri).await.status(), StatusCode::OK);

    let hijack = put_json_as(&app, "u2", &uri, json!({ "title": "mine now" })).await;
    assert_eq!(hijack.status(), StatusCode::NOT_FOUND);
    assert_eq!(delete_as(&app, "u2", &uri).await.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Update & delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_merges_only_given_fields() {
    let app = common::build_test_app();
    let id = create_task(&app, "u1", "Draft", false).await;
    let uri = format!("/api/v1/tasks/{id}");

    let response = put_json_as(&app, "u1", &uri, json!({ "completed": true })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let task = &body_json(response).await["data"];
    assert_eq!(task["completed"], true);
    assert_eq!(task["title"], "Draft");
    assert_eq!(task["responsible"], "alice");
    assert_eq!(task["tags"], json!(["work", "q2"]));
}

#[tokio::test]
async fn delete_returns_204_then_404() {
    let app = common::build_test_app();
    let id = create_task(&app, "u1", "Temp", false).await;
    let uri = format!("/api/v1/tasks/{id}");

    assert_eq!(delete_as(&app, "u1", &uri).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(get_as(&app, "u1", &uri).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(delete_as(&app, "u1", &uri).await.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_mine_pages_and_reports_totals() {
    let app = common::build_test_app();
    for i in 0..12 {
        create_task(&app, "u1", &format!("T{i:02}"), false).await;
    }
    create_task(&app, "u2", "Other", true).await;

    let response = get_as(&app, "u1", "/api/v1/tasks?page=2&limit=5&sort_by=title&sort_order=asc").await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = &body_json(response).await["data"];
    assert_eq!(page["total"], 12);
    assert_eq!(page["page"], 2);
    assert_eq!(page["limit"], 5);
    assert_eq!(page["total_pages"], 3);

    let titles: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["T05", "T06", "T07", "T08", "T09"]);
}

#[tokio::test]
async fn largest_page_number_returns_empty_page_with_total() {
    let app = common::build_test_app();
    create_task(&app, "u1", "Only", false).await;

    let response = get_as(&app, "u1", "/api/v1/tasks?page=9223372036854775807&limit=10").await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = &body_json(response).await["data"];
    assert_eq!(page["total"], 1);
    assert_eq!(page["page"], i64::MAX);
    assert!(page["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn list_items_are_summaries() {
    let app = common::build_test_app();
    create_task(&app, "u1", "Only", false).await;

    let response = get_as(&app, "u1", "/api/v1/tasks").await;
    let item = &body_json(response).await["data"]["items"][0];
    let keys: Vec<&String> = item.as_object().unwrap().keys().collect();

    assert_eq!(keys.len(), 4);
    assert!(item["description"].is_null());
}

#[tokio::test]
async fn list_public_spans_owners_and_excludes_private() {
    let app = common::build_test_app();
    create_task(&app, "u1", "Public one", true).await;
    create_task(&app, "u2", "Public two", true).await;
    create_task(&app, "u2", "Secret", false).await;

    let response = get_as(&app, "u3", "/api/v1/tasks/public?search=public").await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = &body_json(response).await["data"];
    assert_eq!(page["total"], 2);
}

#[tokio::test]
async fn list_filters_by_first_tag_only() {
    let app = common::build_test_app();
    create_task(&app, "u1", "Tagged", false).await;

    let hit = get_as(&app, "u1", "/api/v1/tasks?tags=WORK,nothing").await;
    assert_eq!(body_json(hit).await["data"]["total"], 1);

    let miss = get_as(&app, "u1", "/api/v1/tasks?tags=nothing,work").await;
    assert_eq!(body_json(miss).await["data"]["total"], 0);
}

#[tokio::test]
async fn list_rejects_invalid_parameters() {
    let app = common::build_test_app();
    for query in [
        "limit=0",
        "limit=101",
        "page=0",
        "sort_by=password",
        "sort_order=up",
        "completed=maybe",
        "due_date_from=2024-13-01",
        "due_date_from=2024-05-01&due_date_to=2024-04-01",
    ] {
        let response = get_as(&app, "u1", &format!("/api/v1/tasks?{query}")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "query: {query}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[tokio::test]
async fn attach_and_remove_file() {
    let app = common::build_test_app();
    let id = create_task(&app, "u1", "With file", false).await;
    let uri = format!("/api/v1/tasks/{id}/file");

    let attached = post_json_as(
        &app,
        "u1",
        &uri,
        json!({
            "file_path": "uploads/tasks/brief.pdf",
            "file_name": "brief.pdf",
            "file_size": 2048,
            "file_mime_type": "application/pdf",
        }),
    )
    .await;
    assert_eq!(attached.status(), StatusCode::OK);
    let task = &body_json(attached).await["data"];
    assert_eq!(task["attachment"]["file_name"], "brief.pdf");
    assert_eq!(task["attachment"]["file_size"], 2048);

    let removed = delete_as(&app, "u1", &uri).await;
    assert_eq!(removed.status(), StatusCode::OK);
    assert!(body_json(removed).await["data"]["attachment"].is_null());
}

#[tokio::test]
async fn attach_rejects_oversized_or_wrong_type() {
    let app = common::build_test_app();
    let id = create_task(&app, "u1", "With file", false).await;
    let uri = format!("/api/v1/tasks/{id}/file");

    for (name, mime, size) in [
        ("huge.pdf", "application/pdf", 6 * 1024 * 1024),
        ("notes.txt", "text/plain", 10),
        ("image.gif", "image/png", 10),
    ] {
        let response = post_json_as(
            &app,
            "u1",
            &uri,
            json!({
                "file_path": format!("uploads/tasks/{name}"),
                "file_name": name,
                "file_size": size,
                "file_mime_type": mime,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "file: {name}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}
