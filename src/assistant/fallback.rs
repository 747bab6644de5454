//! Model-driven resolution for input the heuristics could not classify.
//!
//! Protocol per turn:
//! 1. Send the transcript with every tool declaration offered.
//! 2. Plain reply: done.
//! 3. Tool calls: honour the first one only. Decode its arguments, validate,
//!    dispatch, append the assistant call and the tool result to the
//!    transcript, and ask again without tools for the final summary. If that
//!    second request fails, the rendered result stands in for the summary.

use super::catalog::Operation;
use super::dispatch::{DispatchResult, Dispatcher};
use super::error::AssistantError;
use super::extractor::ArgumentSet;
use super::validation::ValidatedCall;
use crate::llm::{ChatError, ChatMessage, ChatReply, ChatService, ToolDeclaration};

pub const SYSTEM_PROMPT: &str = "你是一个智能的待办事项助手。你可以帮助用户管理他们的日常任务。

你具有以下功能：
1. 创建待办事项 - 用户可以添加新的任务，包括标题、内容和截止日期
2. 查看待办事项 - 显示所有任务、已完成的任务或未完成的任务
3. 更新待办事项 - 修改任务的任何信息
4. 删除待办事项 - 移除不需要的任务
5. 搜索待办事项 - 根据关键词查找任务
6. 标记完成 - 将任务标记为已完成

请根据用户的需求选择合适的功能来帮助他们。回复时要友好和有帮助。

如果用户提到日期，请使用YYYY-MM-DD格式（例如：2025-06-26）。";

/// A fresh transcript for one turn.
pub fn seed_transcript(user_input: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_input)]
}

#[derive(Debug, Clone, PartialEq)]
pub enum FallbackOutcome {
    Replied(String),
    ToolDispatched {
        call: ValidatedCall,
        result: DispatchResult,
        summary: String,
    },
    /// The model chose a tool but left out required arguments.
    MissingParameters {
        operation: Operation,
        arguments: ArgumentSet,
        missing: Vec<&'static str>,
    },
}

pub struct ModelFallback<'a> {
    chat: &'a dyn ChatService,
    dispatcher: &'a Dispatcher,
    tools: &'a [ToolDeclaration],
}

impl<'a> ModelFallback<'a> {
    pub fn new(
        chat: &'a dyn ChatService,
        dispatcher: &'a Dispatcher,
        tools: &'a [ToolDeclaration],
    ) -> Self {
        Self {
            chat,
            dispatcher,
            tools,
        }
    }

    pub async fn resolve(
        &self,
        mut transcript: Vec<ChatMessage>,
    ) -> Result<FallbackOutcome, AssistantError> {
        let (content, mut calls) = match self.chat.complete(&transcript, Some(self.tools)).await? {
            ChatReply::Text(text) => return Ok(FallbackOutcome::Replied(text)),
            ChatReply::ToolCalls { content, calls } => (content, calls),
        };

        if calls.len() > 1 {
            tracing::warn!(ignored = calls.len() - 1, "model requested several tool calls; honouring the first");
        }
        calls.truncate(1);
        let Some(tool_call) = calls.first().cloned() else {
            return Err(ChatError::MalformedResponse("empty tool call list".into()).into());
        };

        let name = tool_call.function.name.as_str();
        let operation =
            Operation::from_name(name).ok_or_else(|| AssistantError::UnknownTool(name.to_string()))?;
        let arguments = ArgumentSet::from_json(&tool_call.function.arguments).map_err(|source| {
            AssistantError::MalformedToolArguments {
                tool: name.to_string(),
                source,
            }
        })?;
        tracing::info!(operation = %operation, arguments = %arguments, "model selected tool");

        let call = match ValidatedCall::new(operation, arguments.clone()) {
            Ok(call) => call,
            Err(missing) => {
                tracing::info!(operation = %operation, ?missing, "model tool call missing required parameters");
                return Ok(FallbackOutcome::MissingParameters {
                    operation,
                    arguments,
                    missing,
                });
            }
        };

        let result = self.dispatcher.dispatch(&call).await?;

        transcript.push(ChatMessage::assistant_tool_calls(content, calls));
        transcript.push(ChatMessage::tool(tool_call.id, result.render()));

        // The call is committed; a failed summary must not fail the turn.
        let summary = match self.chat.complete(&transcript, None).await {
            Ok(ChatReply::Text(text)) => text,
            Ok(ChatReply::ToolCalls { .. }) => {
                tracing::warn!(operation = %operation, "summary reply requested tools; showing the raw result");
                result.render()
            }
            Err(e) => {
                tracing::warn!(operation = %operation, error = %e, "summary request failed; showing the raw result");
                result.render()
            }
        };

        Ok(FallbackOutcome::ToolDispatched {
            call,
            result,
            summary,
        })
    }
}
