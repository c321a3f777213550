use axum::http::StatusCode;
use careflow_db::repositories::ClinicStore;
use careflow_sync::remote::MockRemoteApi;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::TestContext;

#[tokio::test]
async fn test_create_appointment_success() {
    let ctx = TestContext::new();
    let alice = ctx.seed_client("Alice", None).await;
    let server = ctx.server();

    let response = server
        .post("/api/appointments")
        .json(&json!({
            "appointment": {
                "client_id": alice.id,
                "scheduled_at": "2025-07-20T09:30:00.000Z",
                "notes": "Initial consultation"
            }
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["client_id"], json!(alice.id));
    assert_eq!(body["scheduled_at"], json!("2025-07-20T09:30:00Z"));
    assert_eq!(body["notes"], json!("Initial consultation"));
    assert_eq!(body["external_id"], Value::Null);
    assert_eq!(ctx.store.count_appointments().await.unwrap(), 1);
}

#[tokio::test]
async fn test_create_appointment_pushes_with_client_external_id() {
    let mut remote = MockRemoteApi::new();
    remote
        .expect_post_json()
        .withf(|path, payload| path == "/appointments" && payload["client_id"] == "c-1")
        .times(1)
        .returning(|_, _| Some(json!({ "id": "a-9" })));
    let ctx = TestContext::with_remote(remote);
    let alice = ctx.seed_client("Alice", Some("c-1")).await;
    let server = ctx.server();

    let response = server
        .post("/api/appointments")
        .json(&json!({
            "appointment": { "client_id": alice.id, "scheduled_at": "2025-07-20 09:30" }
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["external_id"], json!("a-9"));
}

#[tokio::test]
async fn test_create_appointment_duplicate_time() {
    let ctx = TestContext::new();
    let alice = ctx.seed_client("Alice", None).await;
    let bob = ctx.seed_client("Bob", None).await;
    ctx.seed_appointment(alice.id, Utc.with_ymd_and_hms(2025, 7, 20, 9, 30, 0).unwrap())
        .await;
    let server = ctx.server();

    // Same instant written with an offset
    let response = server
        .post("/api/appointments")
        .json(&json!({
            "appointment": { "client_id": bob.id, "scheduled_at": "2025-07-20T11:30:00+02:00" }
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>(),
        json!({ "errors": ["Scheduled at has already been taken"] })
    );
    assert_eq!(ctx.store.count_appointments().await.unwrap(), 1);
}

#[tokio::test]
async fn test_back_to_back_appointments_are_allowed() {
    let ctx = TestContext::new();
    let alice = ctx.seed_client("Alice", None).await;
    ctx.seed_appointment(alice.id, Utc.with_ymd_and_hms(2025, 7, 20, 9, 0, 0).unwrap())
        .await;
    let server = ctx.server();

    let response = server
        .post("/api/appointments")
        .json(&json!({
            "appointment": { "client_id": alice.id, "scheduled_at": "2025-07-20T09:00:01Z" }
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[rstest]
#[case(
    json!({ "notes": "hi" }),
    vec!["Client must exist", "Client can't be blank", "Scheduled at can't be blank"]
)]
#[case(
    json!({ "client_id": "6f1c1f0e-8c55-4f53-a2e3-0f5b9a1d2c3b", "scheduled_at": "2025-07-20T09:00:00Z" }),
    vec!["Client must exist"]
)]
#[case(
    json!({ "client_id": "nope", "scheduled_at": "tomorrow" }),
    vec!["Client must exist", "Scheduled at can't be blank"]
)]
#[tokio::test]
async fn test_create_appointment_validation_errors(
    #[case] appointment: Value,
    #[case] expected: Vec<&str>,
) {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/appointments")
        .json(&json!({ "appointment": appointment }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>(), json!({ "errors": expected }));
}

#[tokio::test]
async fn test_create_appointment_with_numeric_client_id() {
    let ctx = TestContext::new();
    ctx.seed_client("Alice", None).await;
    let server = ctx.server();

    let response = server
        .post("/api/appointments")
        .json(&json!({
            "appointment": { "client_id": 123, "scheduled_at": "2025-07-20T09:00:00Z" }
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>(), json!({ "errors": ["Client must exist"] }));
    assert_eq!(ctx.store.count_appointments().await.unwrap(), 0);
}

#[rstest]
#[case(json!({}))]
#[case(json!({ "appointment": {} }))]
#[tokio::test]
async fn test_create_appointment_without_envelope(#[case] body: Value) {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.post("/api/appointments").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "param is missing or the value is empty: appointment" })
    );
}

#[tokio::test]
async fn test_list_appointments_embeds_client_contact() {
    let ctx = TestContext::new();
    let alice = ctx.seed_client("Alice", None).await;
    let bob = ctx.seed_client("Bob", None).await;
    ctx.seed_appointment(bob.id, Utc.with_ymd_and_hms(2025, 7, 21, 9, 0, 0).unwrap())
        .await;
    ctx.seed_appointment(alice.id, Utc.with_ymd_and_hms(2025, 7, 20, 9, 0, 0).unwrap())
        .await;
    let server = ctx.server();

    let body = server.get("/api/appointments").await.json::<Value>();

    assert_eq!(body["meta"], json!({ "page": 1, "per_page": 20, "total": 2 }));
    assert_eq!(body["data"][0]["client_id"], json!(alice.id));
    assert_eq!(
        body["data"][0]["client"],
        json!({ "name": "Alice", "email": "alice@example.com", "phone": "555-0100" })
    );
    assert_eq!(body["data"][1]["client"]["name"], json!("Bob"));
}

#[tokio::test]
async fn test_list_appointments_clamps_per_page() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let body = server
        .get("/api/appointments")
        .add_query_param("per_page", 500)
        .add_query_param("page", 0)
        .await
        .json::<Value>();

    assert_eq!(body["meta"]["per_page"], json!(100));
    assert_eq!(body["meta"]["page"], json!(1));
}

#[tokio::test]
async fn test_update_appointment_to_its_own_time() {
    let ctx = TestContext::new();
    let alice = ctx.seed_client("Alice", None).await;
    let at = Utc.with_ymd_and_hms(2025, 7, 20, 9, 0, 0).unwrap();
    let appointment = ctx.seed_appointment(alice.id, at).await;
    let server = ctx.server();

    let response = server
        .patch(&format!("/api/appointments/{}", appointment.id))
        .json(&json!({
            "appointment": { "scheduled_at": "2025-07-20T09:00:00Z", "notes": "Same slot" }
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["scheduled_at"], json!("2025-07-20T09:00:00Z"));
    assert_eq!(body["notes"], json!("Same slot"));
}

#[tokio::test]
async fn test_update_appointment_to_taken_time() {
    let ctx = TestContext::new();
    let alice = ctx.seed_client("Alice", None).await;
    let first = ctx
        .seed_appointment(alice.id, Utc.with_ymd_and_hms(2025, 7, 20, 9, 0, 0).unwrap())
        .await;
    let second = ctx
        .seed_appointment(alice.id, Utc.with_ymd_and_hms(2025, 7, 21, 9, 0, 0).unwrap())
        .await;
    let server = ctx.server();

    let response = server
        .patch(&format!("/api/appointments/{}", second.id))
        .json(&json!({ "appointment": { "scheduled_at": "2025-07-20T09:00:00Z" } }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>(),
        json!({ "errors": ["Scheduled at has already been taken"] })
    );
    let unchanged = ctx.store.get_appointment(second.id).await.unwrap().unwrap();
    assert_eq!(unchanged.scheduled_at, Utc.with_ymd_and_hms(2025, 7, 21, 9, 0, 0).unwrap());
    assert!(ctx.store.get_appointment(first.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_update_appointment_partial_and_clearing_notes() {
    let ctx = TestContext::new();
    let alice = ctx.seed_client("Alice", None).await;
    let bob = ctx.seed_client("Bob", None).await;
    let at = Utc.with_ymd_and_hms(2025, 7, 20, 9, 0, 0).unwrap();
    let appointment = ctx.seed_appointment(alice.id, at).await;
    let server = ctx.server();
    let path = format!("/api/appointments/{}", appointment.id);

    let response = server
        .patch(&path)
        .json(&json!({ "appointment": { "client_id": bob.id, "notes": "Reassigned" } }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["client_id"], json!(bob.id));
    assert_eq!(body["scheduled_at"], json!("2025-07-20T09:00:00Z"));
    assert_eq!(body["notes"], json!("Reassigned"));

    let response = server
        .patch(&path)
        .json(&json!({ "appointment": { "notes": null } }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["notes"], Value::Null);
}

#[tokio::test]
async fn test_update_appointment_with_unknown_client() {
    let ctx = TestContext::new();
    let alice = ctx.seed_client("Alice", None).await;
    let appointment = ctx
        .seed_appointment(alice.id, Utc.with_ymd_and_hms(2025, 7, 20, 9, 0, 0).unwrap())
        .await;
    let server = ctx.server();

    let response = server
        .patch(&format!("/api/appointments/{}", appointment.id))
        .json(&json!({ "appointment": { "client_id": Uuid::new_v4() } }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>(), json!({ "errors": ["Client must exist"] }));
}

#[tokio::test]
async fn test_update_missing_appointment() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .patch(&format!("/api/appointments/{}", Uuid::new_v4()))
        .json(&json!({ "appointment": { "notes": "x" } }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>(), json!({ "error": "Appointment not found" }));
}

#[tokio::test]
async fn test_update_appointment_without_envelope() {
    let ctx = TestContext::new();
    let alice = ctx.seed_client("Alice", None).await;
    let appointment = ctx
        .seed_appointment(alice.id, Utc.with_ymd_and_hms(2025, 7, 20, 9, 0, 0).unwrap())
        .await;
    let server = ctx.server();

    let path = format!("/api/appointments/{}", appointment.id);

    for body in [json!({ "notes": "x" }), json!({ "appointment": {} })] {
        let response = server.patch(&path).json(&body).await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>(),
            json!({ "error": "param is missing or the value is empty: appointment" })
        );
    }
}

#[rstest]
#[case(
    json!({ "scheduled_at": null }),
    vec!["Scheduled at can't be blank"]
)]
#[case(
    json!({ "client_id": null }),
    vec!["Client must exist", "Client can't be blank"]
)]
#[case(
    json!({ "client_id": 7, "scheduled_at": null }),
    vec!["Client must exist", "Scheduled at can't be blank"]
)]
#[tokio::test]
async fn test_update_appointment_with_null_attributes(
    #[case] appointment_params: Value,
    #[case] expected: Vec<&str>,
) {
    let ctx = TestContext::new();
    let alice = ctx.seed_client("Alice", None).await;
    let at = Utc.with_ymd_and_hms(2025, 7, 20, 9, 0, 0).unwrap();
    let appointment = ctx.seed_appointment(alice.id, at).await;
    let server = ctx.server();

    let response = server
        .patch(&format!("/api/appointments/{}", appointment.id))
        .json(&json!({ "appointment": appointment_params }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>(), json!({ "errors": expected }));
    let unchanged = ctx.store.get_appointment(appointment.id).await.unwrap().unwrap();
    assert_eq!(unchanged.scheduled_at, at);
    assert_eq!(unchanged.client_id, alice.id);
}

#[tokio::test]
async fn test_delete_appointment() {
    let ctx = TestContext::new();
    let alice = ctx.seed_client("Alice", None).await;
    let appointment = ctx
        .seed_appointment(alice.id, Utc.with_ymd_and_hms(2025, 7, 20, 9, 0, 0).unwrap())
        .await;
    let server = ctx.server();
    let path = format!("/api/appointments/{}", appointment.id);

    let response = server.delete(&path).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(ctx.store.count_appointments().await.unwrap(), 0);

    let response = server.delete(&path).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>(), json!({ "error": "Appointment not found" }));
}
