//! Persistence client against a live HTTP service on an ephemeral port.

use serde_json::json;
use todo_assistant::api::create_router;
use todo_assistant::client::{ClientError, TodoClient, TodoService};
use todo_assistant::db::Database;

async fn spawn_service() -> String {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    format!("http://{}/", addr)
}

#[tokio::test]
async fn round_trips_methods_through_http() {
    let client = TodoClient::new(spawn_service().await);
    assert!(!client.base_url().ends_with('/'));

    let created = client
        .call("create_todo", json!({ "title": "买菜" }))
        .await
        .expect("Request failed");
    let id = created.result.as_ref().expect("Expected result")["todo"]["id"].clone();

    let marked = client
        .call("mark_completed", json!({ "id": id }))
        .await
        .expect("Request failed");
    assert_eq!(marked.result.expect("Expected result")["todo"]["completed"], true);

    let listed = client
        .call("get_todos", json!({ "completed": true }))
        .await
        .expect("Request failed");
    assert_eq!(
        listed.result.expect("Expected result")["todos"]
            .as_array()
            .map(Vec::len),
        Some(1)
    );
}

#[tokio::test]
async fn business_failures_arrive_as_ok_envelopes() {
    let client = TodoClient::new(spawn_service().await);

    let response = client
        .call("delete_todo", json!({ "id": 12 }))
        .await
        .expect("Request failed");

    assert!(response.result.is_none());
    assert_eq!(response.error.as_deref(), Some("待办事项不存在或删除失败"));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local addr");
    drop(listener);

    let client = TodoClient::new(format!("http://{}", addr));
    let err = client.call("get_todos", json!({})).await.unwrap_err();

    assert!(matches!(err, ClientError::Http(_)));
}

#[tokio::test]
async fn unknown_routes_map_to_client_errors() {
    let base = spawn_service().await;
    let client = TodoClient::new(format!("{}nowhere", base));

    let err = client.call("get_todos", json!({})).await.unwrap_err();

    assert!(matches!(err, ClientError::Server(ref msg) if msg.starts_with("404")));
}
