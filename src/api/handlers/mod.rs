use axum::{extract::State, Json};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::db::Database;
use crate::models::*;

// ============================================================
// Error Handling
// ============================================================

/// Log a database failure and turn it into an RPC error body.
///
/// The persistence RPC always answers with an envelope; callers read
/// `error` instead of the HTTP status.
fn internal_error(e: impl std::fmt::Display) -> McpResponse {
    tracing::error!("Internal error: {}", e);
    McpResponse::error(format!("服务器错误: {}", e))
}

fn invalid_params(e: impl std::fmt::Display) -> McpResponse {
    tracing::warn!("Invalid params: {}", e);
    McpResponse::error(format!("参数无效: {}", e))
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, McpResponse> {
    serde_json::from_value(params).map_err(invalid_params)
}

/// Reads a positive integer `id`. Ids encoded as numeric strings are accepted.
fn require_id(params: &Value) -> Result<i64, McpResponse> {
    let id = match params.get("id") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    match id {
        Some(id) if id > 0 => Ok(id),
        _ => Err(McpResponse::error("缺少todo ID")),
    }
}

fn without_id(params: Value) -> Value {
    match params {
        Value::Object(mut map) => {
            map.remove("id");
            Value::Object(map)
        }
        other => other,
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, McpResponse> {
    serde_json::to_value(value).map_err(internal_error)
}

// ============================================================
// RPC
// ============================================================

pub async fn mcp(State(db): State<Database>, Json(request): Json<McpRequest>) -> Json<McpResponse> {
    tracing::debug!(method = %request.method, "rpc request");
    Json(handle_rpc(&db, &request.method, request.params))
}

/// Execute one persistence method against the database.
pub fn handle_rpc(db: &Database, method: &str, params: Value) -> McpResponse {
    let outcome = match method {
        "create_todo" => create_todo(db, params),
        "get_todos" => get_todos(db, params),
        "get_todo" => get_todo(db, params),
        "update_todo" => update_todo(db, params),
        "delete_todo" => delete_todo(db, params),
        "search_todos" => search_todos(db, params),
        "mark_completed" => mark_completed(db, params),
        other => Err(McpResponse::error(format!("不支持的方法: {}", other))),
    };

    match outcome {
        Ok(result) => McpResponse::ok(result),
        Err(response) => response,
    }
}

fn create_todo(db: &Database, params: Value) -> Result<Value, McpResponse> {
    let input: CreateTodoInput = parse_params(params)?;
    let todo = db.create_todo(input).map_err(internal_error)?;
    Ok(json!({ "todo": to_json(&todo)?, "message": "待办事项创建成功" }))
}

fn get_todos(db: &Database, params: Value) -> Result<Value, McpResponse> {
    let completed = params.get("completed").and_then(Value::as_bool);
    let todos = db.get_todos(completed).map_err(internal_error)?;
    Ok(json!({ "todos": to_json(&todos)? }))
}

fn get_todo(db: &Database, params: Value) -> Result<Value, McpResponse> {
    let id = require_id(&params)?;
    let todo = db
        .get_todo(id)
        .map_err(internal_error)?
        .ok_or_else(|| McpResponse::error("待办事项不存在"))?;
    Ok(json!({ "todo": to_json(&todo)? }))
}

fn update_todo(db: &Database, params: Value) -> Result<Value, McpResponse> {
    let id = require_id(&params)?;
    let input: UpdateTodoInput = parse_params(without_id(params))?;
    let todo = db
        .update_todo(id, input)
        .map_err(internal_error)?
        .ok_or_else(|| McpResponse::error("待办事项不存在或更新失败"))?;
    Ok(json!({ "todo": to_json(&todo)?, "message": "待办事项更新成功" }))
}

fn delete_todo(db: &Database, params: Value) -> Result<Value, McpResponse> {
    let id = require_id(&params)?;
    if db.delete_todo(id).map_err(internal_error)? {
        Ok(json!({ "message": "待办事项删除成功" }))
    } else {
        Err(McpResponse::error("待办事项不存在或删除失败"))
    }
}

fn search_todos(db: &Database, params: Value) -> Result<Value, McpResponse> {
    let query = params
        .get("query")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let todos = db.search_todos(query).map_err(internal_error)?;
    Ok(json!({ "todos": to_json(&todos)? }))
}

fn mark_completed(db: &Database, params: Value) -> Result<Value, McpResponse> {
    let id = require_id(&params)?;
    let todo = db
        .mark_completed(id)
        .map_err(internal_error)?
        .ok_or_else(|| McpResponse::error("待办事项不存在或标记失败"))?;
    Ok(json!({ "todo": to_json(&todo)?, "message": "待办事项已标记为完成" }))
}
