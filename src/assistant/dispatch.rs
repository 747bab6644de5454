use std::sync::Arc;

use serde_json::{json, Value};

use super::validation::ValidatedCall;
use crate::client::{ClientError, TodoService};

/// Outcome of one persistence call that completed at the transport level.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    pub succeeded: bool,
    pub payload: Value,
    pub error_message: Option<String>,
}

impl DispatchResult {
    /// Operator-facing text: the remote error, or the payload as pretty JSON.
    pub fn render(&self) -> String {
        match &self.error_message {
            Some(message) => format!("错误: {}", message),
            None => serde_json::to_string_pretty(&self.payload)
                .unwrap_or_else(|_| self.payload.to_string()),
        }
    }
}

/// Sends validated calls to the persistence service. Never retries.
#[derive(Clone)]
pub struct Dispatcher {
    service: Arc<dyn TodoService>,
}

impl Dispatcher {
    pub fn new(service: Arc<dyn TodoService>) -> Self {
        Self { service }
    }

    pub async fn dispatch(&self, call: &ValidatedCall) -> Result<DispatchResult, ClientError> {
        let operation = call.operation();
        let response = self
            .service
            .call(operation.name(), call.arguments().to_value())
            .await?;

        let result = match response.error {
            Some(message) => DispatchResult {
                succeeded: false,
                payload: Value::Null,
                error_message: Some(message),
            },
            None => DispatchResult {
                succeeded: true,
                payload: response.result.unwrap_or_else(|| json!({})),
                error_message: None,
            },
        };

        tracing::info!(
            operation = %operation,
            succeeded = result.succeeded,
            error = result.error_message.as_deref().unwrap_or(""),
            "dispatched"
        );
        Ok(result)
    }
}
