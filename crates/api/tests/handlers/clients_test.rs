use axum::http::StatusCode;
use careflow_db::repositories::ClinicStore;
use careflow_sync::remote::MockRemoteApi;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

use crate::test_utils::TestContext;

#[tokio::test]
async fn test_list_clients_empty() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/api/clients").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({ "data": [], "meta": { "page": 1, "per_page": 20, "total": 0 } })
    );
}

#[tokio::test]
async fn test_list_clients_ordered_by_name() {
    let ctx = TestContext::new();
    for name in ["Charlie", "Alice", "Bob"] {
        ctx.seed_client(name, None).await;
    }
    let server = ctx.server();

    let body = server.get("/api/clients").await.json::<Value>();

    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob", "Charlie"]);
    assert_eq!(body["meta"]["total"], json!(3));
}

#[rstest]
#[case("2", "2", 2, 2, 1)]
#[case("1", "500", 1, 100, 3)]
#[case("0", "2", 1, 2, 2)]
#[case("-3", "2", 1, 2, 2)]
#[case("abc", "xyz", 1, 20, 3)]
#[case("5", "20", 5, 20, 0)]
#[tokio::test]
async fn test_list_clients_pagination(
    #[case] page: &str,
    #[case] per_page: &str,
    #[case] expected_page: i64,
    #[case] expected_per_page: i64,
    #[case] expected_len: usize,
) {
    let ctx = TestContext::new();
    for name in ["Alice", "Bob", "Charlie"] {
        ctx.seed_client(name, None).await;
    }
    let server = ctx.server();

    let response = server
        .get("/api/clients")
        .add_query_param("page", page)
        .add_query_param("per_page", per_page)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["meta"]["page"], json!(expected_page));
    assert_eq!(body["meta"]["per_page"], json!(expected_per_page));
    assert_eq!(body["meta"]["total"], json!(3));
    assert_eq!(body["data"].as_array().unwrap().len(), expected_len);
}

#[tokio::test]
async fn test_create_client_success() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/clients")
        .json(&json!({
            "client": { "name": "Alice", "email": "alice@example.com", "phone": "123-456-7890" }
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["name"], json!("Alice"));
    assert_eq!(body["email"], json!("alice@example.com"));
    assert_eq!(body["phone"], json!("123-456-7890"));
    assert_eq!(body["external_id"], Value::Null);
    assert!(body["id"].is_string());
    assert_eq!(ctx.store.count_clients().await.unwrap(), 1);
}

#[tokio::test]
async fn test_create_client_stores_remote_id() {
    let mut remote = MockRemoteApi::new();
    remote
        .expect_post_json()
        .withf(|path, payload| {
            path == "/clients"
                && payload["name"] == "Alice"
                && payload["email"] == "alice@example.com"
                && payload["phone"] == "123"
        })
        .times(1)
        .returning(|_, _| Some(json!({ "id": 42, "name": "Alice" })));
    let ctx = TestContext::with_remote(remote);
    let server = ctx.server();

    let response = server
        .post("/api/clients")
        .json(&json!({ "client": { "name": "Alice", "email": "alice@example.com", "phone": "123" } }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["external_id"], json!("42"));
    let stored = ctx.store.find_client_by_external_id("42").await.unwrap();
    assert!(stored.is_some());
}

#[rstest]
#[case(
    json!({ "name": null, "email": "", "phone": " " }),
    vec!["Name can't be blank", "Email can't be blank", "Phone can't be blank"]
)]
#[case(
    json!({ "name": "  ", "email": "alice@example.com", "phone": "1" }),
    vec!["Name can't be blank"]
)]
#[case(
    json!({ "name": "Alice", "email": "not-an-email", "phone": "1" }),
    vec!["Email is invalid"]
)]
#[tokio::test]
async fn test_create_client_validation_errors(#[case] client: Value, #[case] expected: Vec<&str>) {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.post("/api/clients").json(&json!({ "client": client })).await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>(), json!({ "errors": expected }));
    assert_eq!(ctx.store.count_clients().await.unwrap(), 0);
}

#[rstest]
#[case(json!({ "name": "Alice" }))]
#[case(json!({ "client": null }))]
#[case(json!({ "client": {} }))]
#[tokio::test]
async fn test_create_client_without_envelope(#[case] body: Value) {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.post("/api/clients").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "param is missing or the value is empty: client" })
    );
}

#[tokio::test]
async fn test_create_client_malformed_body() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.post("/api/clients").text("{\"client\": ").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_delete_client_cascades_to_appointments() {
    let ctx = TestContext::new();
    let alice = ctx.seed_client("Alice", None).await;
    let bob = ctx.seed_client("Bob", None).await;
    ctx.seed_appointment(alice.id, Utc.with_ymd_and_hms(2025, 7, 20, 9, 0, 0).unwrap())
        .await;
    ctx.seed_appointment(alice.id, Utc.with_ymd_and_hms(2025, 7, 21, 9, 0, 0).unwrap())
        .await;
    ctx.seed_appointment(bob.id, Utc.with_ymd_and_hms(2025, 7, 22, 9, 0, 0).unwrap())
        .await;
    let server = ctx.server();

    let response = server.delete(&format!("/api/clients/{}", alice.id)).await;

    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(response.text(), "");
    let listed = server.get("/api/appointments").await.json::<Value>();
    assert_eq!(listed["meta"]["total"], json!(1));
    assert_eq!(listed["data"][0]["client"]["name"], json!("Bob"));
}

#[rstest]
#[case("/api/clients/6f1c1f0e-8c55-4f53-a2e3-0f5b9a1d2c3b")]
#[case("/api/clients/not-a-uuid")]
#[tokio::test]
async fn test_delete_unknown_client(#[case] path: &str) {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.delete(path).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>(), json!({ "error": "Client not found" }));
}

#[tokio::test]
async fn test_health_and_version() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let health = server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::OK);
    assert_eq!(health.json::<Value>(), json!({ "status": "ok" }));

    let version = server.get("/version").await;
    assert_eq!(version.status_code(), StatusCode::OK);
    assert_eq!(
        version.json::<Value>(),
        json!({ "version": env!("CARGO_PKG_VERSION") })
    );
}
