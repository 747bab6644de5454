//! Request types for MCP tools.

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateTodoRequest {
    #[schemars(description = "待办事项标题")]
    pub title: String,
    #[schemars(description = "待办事项详细内容")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[schemars(description = "截止日期，格式：YYYY-MM-DD")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetTodosRequest {
    #[schemars(description = "筛选完成状态：true为已完成，false为未完成，不提供则显示全部")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TodoIdRequest {
    #[schemars(description = "待办事项ID")]
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateTodoRequest {
    #[schemars(description = "待办事项ID")]
    pub id: i64,
    #[schemars(description = "新的标题")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[schemars(description = "新的内容")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[schemars(description = "新的截止日期，格式：YYYY-MM-DD")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[schemars(description = "完成状态")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchTodosRequest {
    #[schemars(description = "搜索关键词")]
    pub query: String,
}
