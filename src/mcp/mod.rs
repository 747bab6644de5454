//! MCP stdio server exposing the todo store as tools.
//!
//! Every tool goes through [`handle_rpc`], so tool results carry exactly the
//! payloads and messages of the HTTP `POST /mcp` surface.

mod types;

pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;
use serde_json::Value;

use crate::api::handle_rpc;
use crate::db::Database;

#[derive(Clone)]
pub struct TodoMcpServer {
    db: Database,
    tool_router: ToolRouter<Self>,
}

impl TodoMcpServer {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            tool_router: Self::tool_router(),
        }
    }

    /// Run one persistence method and return its result payload.
    ///
    /// Business failures ("待办事项不存在", "缺少todo ID", ...) become
    /// `invalid_params` errors carrying the same message.
    pub fn invoke<T: Serialize>(&self, method: &str, request: &T) -> Result<Value, McpError> {
        let params = serde_json::to_value(request)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        let response = handle_rpc(&self.db, method, params);
        match response.error {
            Some(message) => Err(McpError::invalid_params(message, None)),
            None => Ok(response.result.unwrap_or(Value::Null)),
        }
    }

    fn respond<T: Serialize>(&self, method: &str, request: &T) -> Result<CallToolResult, McpError> {
        let result = self.invoke(method, request)?;
        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_router]
impl TodoMcpServer {
    #[tool(description = "创建新的待办事项。返回创建的待办事项及提示信息。")]
    async fn create_todo(
        &self,
        params: Parameters<CreateTodoRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.respond("create_todo", &params.0)
    }

    #[tool(description = "获取待办事项列表，可按完成状态筛选。按创建时间倒序排列。")]
    async fn get_todos(
        &self,
        params: Parameters<GetTodosRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.respond("get_todos", &params.0)
    }

    #[tool(description = "根据ID获取单个待办事项。")]
    async fn get_todo(&self, params: Parameters<TodoIdRequest>) -> Result<CallToolResult, McpError> {
        self.respond("get_todo", &params.0)
    }

    #[tool(description = "更新待办事项的信息。只修改提供的字段。")]
    async fn update_todo(
        &self,
        params: Parameters<UpdateTodoRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.respond("update_todo", &params.0)
    }

    #[tool(description = "删除指定的待办事项。")]
    async fn delete_todo(
        &self,
        params: Parameters<TodoIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.respond("delete_todo", &params.0)
    }

    #[tool(description = "根据关键词搜索待办事项的标题和内容。")]
    async fn search_todos(
        &self,
        params: Parameters<SearchTodosRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.respond("search_todos", &params.0)
    }

    #[tool(description = "将待办事项标记为已完成。")]
    async fn mark_completed(
        &self,
        params: Parameters<TodoIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.respond("mark_completed", &params.0)
    }
}

#[tool_handler]
impl ServerHandler for TodoMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "todo-assistant".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"Todo store with seven tools.

- create_todo: title is required; due_date uses YYYY-MM-DD.
- get_todos: pass completed=true/false to filter, omit for all.
- get_todo / delete_todo / mark_completed: need the numeric id.
- update_todo: id plus any fields to change.
- search_todos: substring match on title and content.

Ids come from create_todo or get_todos results."#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(db: Database) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = TodoMcpServer::new(db);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
