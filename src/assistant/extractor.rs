//! Heuristic argument extraction.
//!
//! Best-effort: every rule may miss, and a missed field is simply absent
//! from the [`ArgumentSet`]. Required-field checks happen in
//! [`validation`](super::validation), never here.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::catalog::Operation;

/// Named, typed arguments for one operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentSet {
    values: Map<String, Value>,
}

impl ArgumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a JSON object. Anything other than an object is an error.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Present and not JSON `null`.
    pub fn has(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(|v| !v.is_null())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

impl fmt::Display for ArgumentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.values.clone()))
    }
}

/// Opening delimiter after a label: a colon with optional quote, or a quote.
const OPENER: &str = r#"(?:[：:]\s*["'“‘「『]?|["'“‘「『])"#;
/// Captured phrase: everything up to the next quote.
const PHRASE: &str = r#"([^"'“”‘’「」『』]+)"#;
const LAZY_PHRASE: &str = r#"([^"'“”‘’「」『』]+?)"#;
const CLOSER: &str = r#"["'”’」』]?"#;
const QUOTE: &str = r#"["'“‘「『]"#;
/// Filler after an unquoted search term.
const TRAILER: &str = "(?:相关)?(?:的任务|的待办)?";

pub struct ParameterExtractor {
    title: Vec<Regex>,
    date: Regex,
    query: Vec<Regex>,
    id: Vec<Regex>,
    new_title: Regex,
}

impl ParameterExtractor {
    pub fn new() -> Self {
        let compile = |p: &str| Regex::new(p).expect("extraction pattern must compile");

        Self {
            title: vec![
                compile(&format!("创建.*?{OPENER}{PHRASE}")),
                compile(&format!("添加.*?{OPENER}{PHRASE}")),
                compile(&format!("任务{OPENER}{PHRASE}")),
                compile(&format!("做.*?{OPENER}{PHRASE}")),
            ],
            date: compile(r"([0-9]{4}-[0-9]{2}-[0-9]{2})"),
            query: vec![
                compile(&format!(r#"搜索[：:]?\s*{QUOTE}{PHRASE}"#)),
                compile(&format!(r#"查找[：:]?\s*{QUOTE}{PHRASE}"#)),
                compile(&format!(r#"包含\s*["'“‘「『]?{LAZY_PHRASE}{CLOSER}\s*的"#)),
                compile(&format!(r#"搜索[：:]?\s*{LAZY_PHRASE}{TRAILER}\s*$"#)),
                compile(&format!(r#"查找[：:]?\s*{LAZY_PHRASE}{TRAILER}\s*$"#)),
            ],
            id: vec![
                compile(r"任务\s*([0-9]+)"),
                compile(r"(?:^|[^A-Za-z])(?i:id)\s*[:：#]?\s*([0-9]+)"),
                compile(r"编号\s*([0-9]+)"),
                compile(r"第\s*([0-9]+)\s*个"),
            ],
            new_title: compile(&format!(
                r#"标题(?:改为|改成|为|是)\s*[：:]?\s*["'“‘「『]?{PHRASE}"#
            )),
        }
    }

    /// Extract what the text offers for `operation`. Pure; never fails.
    pub fn extract(&self, text: &str, operation: Operation) -> ArgumentSet {
        let mut args = ArgumentSet::new();

        match operation {
            Operation::CreateTodo => {
                if let Some(title) = self.title(text) {
                    args.insert("title", title);
                }
                if let Some(date) = self.date(text) {
                    args.insert("due_date", date);
                }
            }
            Operation::GetTodos => {
                if text.contains("未完成") {
                    args.insert("completed", false);
                } else if text.contains("已完成") {
                    args.insert("completed", true);
                }
            }
            Operation::SearchTodos => {
                if let Some(query) = first_capture(&self.query, text) {
                    args.insert("query", query);
                }
            }
            Operation::UpdateTodo => {
                if let Some(id) = self.id(text) {
                    args.insert("id", id);
                }
                if let Some(title) = self.new_title.captures(text).and_then(|c| trimmed(&c, 1)) {
                    args.insert("title", title);
                }
                if let Some(date) = self.date(text) {
                    args.insert("due_date", date);
                }
            }
            Operation::DeleteTodo | Operation::MarkCompleted => {
                if let Some(id) = self.id(text) {
                    args.insert("id", id);
                }
            }
        }

        args
    }

    fn title(&self, text: &str) -> Option<String> {
        if let Some(title) = first_capture(&self.title, text) {
            return Some(title);
        }

        // No delimited title: everything after the create marker.
        let marker = "创建";
        let start = text.find(marker)? + marker.len();
        let rest = text[start..].trim();
        (!rest.is_empty()).then(|| rest.to_string())
    }

    fn date(&self, text: &str) -> Option<String> {
        self.date
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn id(&self, text: &str) -> Option<i64> {
        self.id.iter().find_map(|re| {
            re.captures(text)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
        })
    }
}

impl Default for ParameterExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First pattern whose group 1 is non-empty after trimming.
fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.captures(text).and_then(|c| trimmed(&c, 1)))
}

fn trimmed(captures: &regex::Captures<'_>, group: usize) -> Option<String> {
    let value = captures.get(group)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}
