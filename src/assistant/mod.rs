//! Intent resolution: free text in, one todo operation (or a model reply) out.
//!
//! A turn moves through one of two paths:
//!
//! ```text
//! Start -> Classified -> Extracted -> Validated -> Dispatched -> Done
//!                                  \-> MissingParameters -> Done
//! Start -> Unclassified -> ModelInvoked -> ToolDispatched | Replied -> Done
//! ```
//!
//! A classified intent with missing required fields is reported back to the
//! operator. It does not fall back to the model; only an unclassified intent
//! does.

pub mod catalog;
pub mod classifier;
pub mod dispatch;
mod error;
pub mod extractor;
pub mod fallback;
pub mod validation;

use std::sync::Arc;

pub use catalog::{tool_declarations, Operation};
pub use classifier::{ConfidenceSource, IntentClassifier, ParsedIntent};
pub use dispatch::{DispatchResult, Dispatcher};
pub use error::AssistantError;
pub use extractor::{ArgumentSet, ParameterExtractor};
pub use fallback::{FallbackOutcome, ModelFallback, SYSTEM_PROMPT};
pub use validation::{validate, ValidatedCall};

use crate::client::TodoService;
use crate::llm::{ChatService, ToolDeclaration};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolutionMode {
    /// Heuristic cascade first, model only for unclassified input.
    #[default]
    Hybrid,
    /// Every turn goes to the model.
    ModelOnly,
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Dispatched {
        intent: ParsedIntent,
        arguments: ArgumentSet,
        result: DispatchResult,
    },
    MissingParameters {
        operation: Operation,
        arguments: ArgumentSet,
        missing: Vec<&'static str>,
    },
    ModelReply(String),
    ModelToolDispatched {
        intent: ParsedIntent,
        arguments: ArgumentSet,
        result: DispatchResult,
        summary: String,
    },
}

impl TurnOutcome {
    pub fn render(&self) -> String {
        match self {
            Self::Dispatched {
                intent,
                arguments,
                result,
            } => format!(
                "预测意图: {}\n提取参数: {}\n\n执行结果:\n{}",
                intent.operation,
                arguments,
                result.render()
            ),
            Self::MissingParameters { missing, .. } => {
                format!("缺少必需参数：{}。请提供更多信息。", missing.join(", "))
            }
            Self::ModelReply(text) => text.clone(),
            Self::ModelToolDispatched { summary, .. } => summary.clone(),
        }
    }
}

impl From<FallbackOutcome> for TurnOutcome {
    fn from(outcome: FallbackOutcome) -> Self {
        match outcome {
            FallbackOutcome::Replied(text) => Self::ModelReply(text),
            FallbackOutcome::ToolDispatched {
                call,
                result,
                summary,
            } => Self::ModelToolDispatched {
                intent: ParsedIntent {
                    operation: call.operation(),
                    source: ConfidenceSource::ModelDecision,
                },
                arguments: call.arguments().clone(),
                result,
                summary,
            },
            FallbackOutcome::MissingParameters {
                operation,
                arguments,
                missing,
            } => Self::MissingParameters {
                operation,
                arguments,
                missing,
            },
        }
    }
}

/// What the heuristics make of an input. Nothing is dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub intent: Option<ParsedIntent>,
    pub arguments: ArgumentSet,
    pub missing: Vec<&'static str>,
}

impl Analysis {
    pub fn render(&self) -> String {
        let Some(intent) = self.intent else {
            return "预测意图: 未识别（将交给模型处理）".to_string();
        };

        let mut out = format!(
            "预测意图: {} ({})\n提取参数: {}",
            intent.operation,
            intent.source.as_str(),
            self.arguments
        );
        if !self.missing.is_empty() {
            out.push_str(&format!("\n缺少必需参数: {}", self.missing.join(", ")));
        }
        out
    }
}

pub struct Assistant {
    classifier: IntentClassifier,
    extractor: ParameterExtractor,
    dispatcher: Dispatcher,
    chat: Arc<dyn ChatService>,
    tools: Vec<ToolDeclaration>,
    mode: ResolutionMode,
}

impl Assistant {
    pub fn new(todos: Arc<dyn TodoService>, chat: Arc<dyn ChatService>) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            extractor: ParameterExtractor::new(),
            dispatcher: Dispatcher::new(todos),
            chat,
            tools: tool_declarations(),
            mode: ResolutionMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    /// Classify and extract only: no persistence call, no model call.
    pub fn analyze(&self, input: &str) -> Analysis {
        let Some(intent) = self.classifier.classify_detailed(input) else {
            return Analysis {
                intent: None,
                arguments: ArgumentSet::new(),
                missing: vec![],
            };
        };

        let arguments = self.extractor.extract(input, intent.operation);
        let missing = validate(intent.operation, &arguments);
        Analysis {
            intent: Some(intent),
            arguments,
            missing,
        }
    }

    /// Run one turn. Each call is independent: no state carries over.
    pub async fn process_turn(&self, input: &str) -> Result<TurnOutcome, AssistantError> {
        let intent = match self.mode {
            ResolutionMode::Hybrid => self.classifier.classify_detailed(input),
            ResolutionMode::ModelOnly => None,
        };

        let Some(intent) = intent else {
            tracing::debug!(mode = ?self.mode, "intent unresolved, invoking model");
            return self.resolve_via_model(input).await;
        };

        tracing::debug!(
            operation = %intent.operation,
            source = intent.source.as_str(),
            "intent classified"
        );

        let arguments = self.extractor.extract(input, intent.operation);
        let call = match ValidatedCall::new(intent.operation, arguments.clone()) {
            Ok(call) => call,
            Err(missing) => {
                tracing::info!(operation = %intent.operation, ?missing, "missing required parameters");
                return Ok(TurnOutcome::MissingParameters {
                    operation: intent.operation,
                    arguments,
                    missing,
                });
            }
        };

        let result = self.dispatcher.dispatch(&call).await?;
        Ok(TurnOutcome::Dispatched {
            intent,
            arguments,
            result,
        })
    }

    /// Run one turn and render it for the operator. Failures become a
    /// generic message instead of propagating.
    pub async fn respond(&self, input: &str) -> String {
        match self.process_turn(input).await {
            Ok(outcome) => outcome.render(),
            Err(e) => {
                tracing::warn!(error = %e, "turn failed");
                format!("处理请求时出错: {}", e)
            }
        }
    }

    async fn resolve_via_model(&self, input: &str) -> Result<TurnOutcome, AssistantError> {
        let fallback = ModelFallback::new(self.chat.as_ref(), &self.dispatcher, &self.tools);
        let outcome = fallback.resolve(fallback::seed_transcript(input)).await?;
        Ok(outcome.into())
    }
}
