use std::sync::Arc;

use axum_test::TestServer;
use petadmin_api::{create_router, AppState};
use petadmin_core::Settings;
use petadmin_store::{SeedCounts, Store};
use serde_json::json;

async fn seeded_server() -> TestServer {
    let store = Store::open_in_memory().await.expect("open store");
    store
        .seed_demo(&SeedCounts::default())
        .await
        .expect("seed demo data");
    let state = AppState::with_store(store, Arc::new(Settings::default()));
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let server = seeded_server().await;

    let resp = server.get("/health").await;
    assert_eq!(resp.status_code(), 200);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn users_listing_filters_and_paginates() {
    let server = seeded_server().await;

    let resp = server.get("/users").await;
    assert_eq!(resp.status_code(), 200);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["total"], 12);
    assert_eq!(body["per_page"], 20);

    let resp = server.get("/users?role=admin").await;
    let body: serde_json::Value = resp.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["role"], "admin");

    let resp = server.get("/users?per_page=5&page=3").await;
    let body: serde_json::Value = resp.json();
    assert_eq!(body["total"], 12);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_filter_values_are_rejected() {
    let server = seeded_server().await;

    let resp = server.get("/users?role=superuser").await;
    assert_eq!(resp.status_code(), 400);

    let resp = server.get("/pets?status=fostered").await;
    assert_eq!(resp.status_code(), 400);
}

#[tokio::test]
async fn pet_detail_includes_vaccination_history() {
    let server = seeded_server().await;

    let resp = server.get("/pets?per_page=1").await;
    let body: serde_json::Value = resp.json();
    let pet_id = body["items"][0]["id"].as_str().unwrap().to_string();

    let resp = server.get(&format!("/pets/{}", pet_id)).await;
    assert_eq!(resp.status_code(), 200);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["id"], pet_id.as_str());
    assert!(body["vaccinations"].is_array());
}

#[tokio::test]
async fn unknown_ids_return_not_found() {
    let server = seeded_server().await;

    let resp = server
        .get("/pets/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(resp.status_code(), 404);

    let resp = server
        .get("/applications/00000000-0000-0000-0000-000000000000")
        .await;
    assert_eq!(resp.status_code(), 404);
}

#[tokio::test]
async fn decision_endpoint_approves_once_then_conflicts() {
    let server = seeded_server().await;

    let resp = server.get("/applications?status=pending&per_page=1").await;
    assert_eq!(resp.status_code(), 200);
    let body: serde_json::Value = resp.json();
    assert!(body["total"].as_i64().unwrap() > 0);
    let application_id = body["items"][0]["id"].as_str().unwrap().to_string();

    let resp = server
        .post(&format!("/applications/{}/decision", application_id))
        .json(&json!({"decision": "approved", "fee_cents": 5000}))
        .await;
    assert_eq!(resp.status_code(), 200);
    let decided: serde_json::Value = resp.json();
    assert_eq!(decided["status"], "approved");
    assert_eq!(decided["pet_status"], "adopted");
    assert!(decided["decided_at"].is_string());

    // a decided application is immutable
    let resp = server
        .post(&format!("/applications/{}/decision", application_id))
        .json(&json!({"decision": "rejected"}))
        .await;
    assert_eq!(resp.status_code(), 409);
}

#[tokio::test]
async fn dashboard_reports_seeded_counts() {
    let server = seeded_server().await;

    let resp = server.get("/dashboard").await;
    assert_eq!(resp.status_code(), 200);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["total_users"], 12);
    assert_eq!(body["total_pets"], 16);
    assert!(body["total_adoptions"].as_i64().unwrap() > 0);
    assert!(body["pets_by_species"].is_array());
    assert!(body["adoptions_by_month"].is_array());
}

#[tokio::test]
async fn vaccinations_filter_by_due_date() {
    let server = seeded_server().await;

    let resp = server.get("/vaccinations").await;
    assert_eq!(resp.status_code(), 200);
    let body: serde_json::Value = resp.json();
    let total = body["total"].as_i64().unwrap();
    assert_eq!(total, 16);

    // seeded due dates land within 45 days of today
    let resp = server.get("/vaccinations?due_before=2099-01-01").await;
    let body: serde_json::Value = resp.json();
    assert_eq!(body["total"], 8);
    assert!(body["items"][0]["pet_name"].is_string());
}
