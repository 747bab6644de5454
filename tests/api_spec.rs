use axum_test::TestServer;
use serde_json::{json, Value};
use todo_assistant::api::create_router;
use todo_assistant::db::Database;
use todo_assistant::models::*;

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);
    TestServer::new(app).expect("Failed to create test server")
}

async fn rpc(server: &TestServer, method: &str, params: Value) -> McpResponse {
    let response = server
        .post("/mcp")
        .json(&json!({ "method": method, "params": params }))
        .await;
    response.assert_status_ok();
    response.json::<McpResponse>()
}

async fn create_test_todo(server: &TestServer, title: &str) -> Todo {
    let response = rpc(server, "create_todo", json!({ "title": title })).await;
    let result = response.result.expect("Expected result");
    serde_json::from_value(result["todo"].clone()).expect("Expected todo")
}

mod create_todo {
    use super::*;

    #[tokio::test]
    async fn returns_todo_and_message() {
        let server = setup();

        let response = rpc(
            &server,
            "create_todo",
            json!({ "title": "学习Python编程", "due_date": "2025-06-26" }),
        )
        .await;

        assert!(response.error.is_none());
        let result = response.result.expect("Expected result");
        assert_eq!(result["message"], "待办事项创建成功");
        assert_eq!(result["todo"]["title"], "学习Python编程");
        assert_eq!(result["todo"]["due_date"], "2025-06-26");
        assert_eq!(result["todo"]["completed"], false);
    }

    #[tokio::test]
    async fn missing_title_is_invalid_params() {
        let server = setup();

        let response = rpc(&server, "create_todo", json!({ "content": "无标题" })).await;

        assert!(response.result.is_none());
        assert!(response.error.expect("Expected error").starts_with("参数无效"));
    }
}

mod get_todos {
    use super::*;

    #[tokio::test]
    async fn lists_newest_first_with_optional_filter() {
        let server = setup();
        let first = create_test_todo(&server, "first").await;
        create_test_todo(&server, "second").await;
        rpc(&server, "mark_completed", json!({ "id": first.id })).await;

        let all = rpc(&server, "get_todos", json!({})).await.result.unwrap();
        let titles: Vec<&str> = all["todos"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|t| t["title"].as_str())
            .collect();
        assert_eq!(titles, vec!["second", "first"]);

        let done = rpc(&server, "get_todos", json!({ "completed": true }))
            .await
            .result
            .unwrap();
        assert_eq!(done["todos"].as_array().unwrap().len(), 1);
        assert_eq!(done["todos"][0]["title"], "first");
    }

    #[tokio::test]
    async fn params_may_be_omitted() {
        let server = setup();

        let response = server
            .post("/mcp")
            .json(&json!({ "method": "get_todos" }))
            .await
            .json::<McpResponse>();

        assert_eq!(response.result, Some(json!({ "todos": [] })));
    }
}

mod by_id {
    use super::*;

    #[tokio::test]
    async fn get_todo_returns_the_record() {
        let server = setup();
        let todo = create_test_todo(&server, "写周报").await;

        let response = rpc(&server, "get_todo", json!({ "id": todo.id })).await;
        let result = response.result.expect("Expected result");
        assert_eq!(result["todo"]["id"], todo.id);
    }

    #[tokio::test]
    async fn get_todo_missing_reports_not_found() {
        let server = setup();

        let response = rpc(&server, "get_todo", json!({ "id": 5 })).await;
        assert_eq!(response.error.as_deref(), Some("待办事项不存在"));
    }

    #[tokio::test]
    async fn missing_id_is_reported() {
        let server = setup();

        for method in ["get_todo", "update_todo", "delete_todo", "mark_completed"] {
            let response = rpc(&server, method, json!({})).await;
            assert_eq!(response.error.as_deref(), Some("缺少todo ID"), "{method}");
        }
    }

    #[tokio::test]
    async fn update_changes_given_fields() {
        let server = setup();
        let todo = create_test_todo(&server, "旧标题").await;

        let response = rpc(
            &server,
            "update_todo",
            json!({ "id": todo.id, "title": "完成项目" }),
        )
        .await;

        let result = response.result.expect("Expected result");
        assert_eq!(result["message"], "待办事项更新成功");
        assert_eq!(result["todo"]["title"], "完成项目");
    }

    #[tokio::test]
    async fn update_missing_reports_failure() {
        let server = setup();

        let response = rpc(&server, "update_todo", json!({ "id": 8, "title": "x" })).await;
        assert_eq!(response.error.as_deref(), Some("待办事项不存在或更新失败"));
    }

    #[tokio::test]
    async fn delete_then_delete_again() {
        let server = setup();
        let todo = create_test_todo(&server, "删除我").await;

        let first = rpc(&server, "delete_todo", json!({ "id": todo.id })).await;
        assert_eq!(
            first.result,
            Some(json!({ "message": "待办事项删除成功" }))
        );

        let second = rpc(&server, "delete_todo", json!({ "id": todo.id })).await;
        assert_eq!(second.error.as_deref(), Some("待办事项不存在或删除失败"));
    }

    #[tokio::test]
    async fn mark_completed_accepts_string_ids() {
        let server = setup();
        let todo = create_test_todo(&server, "标记我").await;

        let response = rpc(
            &server,
            "mark_completed",
            json!({ "id": todo.id.to_string() }),
        )
        .await;

        let result = response.result.expect("Expected result");
        assert_eq!(result["message"], "待办事项已标记为完成");
        assert_eq!(result["todo"]["completed"], true);
    }

    #[tokio::test]
    async fn mark_completed_missing_reports_failure() {
        let server = setup();

        let response = rpc(&server, "mark_completed", json!({ "id": 3 })).await;
        assert_eq!(response.error.as_deref(), Some("待办事项不存在或标记失败"));
    }
}

mod search_todos {
    use super::*;

    #[tokio::test]
    async fn returns_matching_todos() {
        let server = setup();
        create_test_todo(&server, "学习Rust").await;
        create_test_todo(&server, "买菜").await;

        let response = rpc(&server, "search_todos", json!({ "query": "学习" })).await;
        let result = response.result.expect("Expected result");
        let todos = result["todos"].as_array().unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0]["title"], "学习Rust");
    }
}

mod unknown_method {
    use super::*;

    #[tokio::test]
    async fn reports_unsupported_method() {
        let server = setup();

        let response = rpc(&server, "archive_todo", json!({})).await;
        assert_eq!(response.error.as_deref(), Some("不支持的方法: archive_todo"));
        assert!(response.result.is_none());
    }
}
