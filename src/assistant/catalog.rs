//! Static registry of the six operations the assistant can perform.
//!
//! Each [`Operation`] owns an [`OperationSpec`]: description, trigger
//! keywords, intent patterns and parameter specification. The table is the
//! single source for classification, extraction rules, validation and the
//! tool declarations offered to the model.

use std::fmt;

use serde_json::{json, Map, Value};

use crate::llm::ToolDeclaration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateTodo,
    GetTodos,
    UpdateTodo,
    DeleteTodo,
    SearchTodos,
    MarkCompleted,
}

impl Operation {
    /// Catalog declaration order. Keyword scoring walks operations in this order.
    pub const ALL: [Operation; 6] = [
        Self::CreateTodo,
        Self::GetTodos,
        Self::UpdateTodo,
        Self::DeleteTodo,
        Self::SearchTodos,
        Self::MarkCompleted,
    ];

    /// Order in which intent patterns are tried. First operation with a
    /// matching pattern wins, so this order is the tie-break between
    /// overlapping patterns.
    pub const PATTERN_PRIORITY: [Operation; 6] = [
        Self::CreateTodo,
        Self::GetTodos,
        Self::SearchTodos,
        Self::UpdateTodo,
        Self::DeleteTodo,
        Self::MarkCompleted,
    ];

    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn spec(&self) -> &'static OperationSpec {
        match self {
            Self::CreateTodo => &CREATE_TODO,
            Self::GetTodos => &GET_TODOS,
            Self::UpdateTodo => &UPDATE_TODO,
            Self::DeleteTodo => &DELETE_TODO,
            Self::SearchTodos => &SEARCH_TODOS,
            Self::MarkCompleted => &MARK_COMPLETED,
        }
    }

    pub fn required_params(&self) -> impl Iterator<Item = &'static str> {
        self.spec()
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Boolean,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

#[derive(Debug)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamType,
    pub format: Option<&'static str>,
    pub required: bool,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct OperationSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Literal substrings scored against lower-cased input.
    pub keywords: &'static [&'static str],
    /// Regular expressions, matched case-insensitively, in order.
    pub intent_patterns: &'static [&'static str],
    pub params: &'static [ParamSpec],
}

impl OperationSpec {
    /// JSON Schema for the argument object.
    pub fn parameter_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in self.params {
            let mut property = Map::new();
            property.insert("type".into(), json!(param.kind.as_str()));
            if let Some(format) = param.format {
                property.insert("format".into(), json!(format));
            }
            property.insert("description".into(), json!(param.description));
            properties.insert(param.name.into(), Value::Object(property));
        }

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }

        Value::Object(schema)
    }

    pub fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name.to_string(),
            description: self.description.to_string(),
            parameters: self.parameter_schema(),
        }
    }
}

/// Tool declarations for every operation, in catalog order.
pub fn tool_declarations() -> Vec<ToolDeclaration> {
    Operation::ALL
        .iter()
        .map(|op| op.spec().declaration())
        .collect()
}

const ID_PARAM: ParamSpec = ParamSpec {
    name: "id",
    kind: ParamType::Integer,
    format: None,
    required: true,
    description: "待办事项ID",
};

static CREATE_TODO: OperationSpec = OperationSpec {
    name: "create_todo",
    description: "创建新的待办事项。关键词：创建、添加、新建、新增、建立、制作",
    keywords: &["创建", "添加", "新建", "新增", "建立", "制作", "做", "任务"],
    intent_patterns: &[
        r"创建.*任务",
        r"添加.*待办",
        r"新建.*事项",
        r"做.*任务",
        r"我要.*做",
        r"需要.*完成",
    ],
    params: &[
        ParamSpec {
            name: "title",
            kind: ParamType::String,
            format: None,
            required: true,
            description: "待办事项标题",
        },
        ParamSpec {
            name: "content",
            kind: ParamType::String,
            format: None,
            required: false,
            description: "待办事项详细内容",
        },
        ParamSpec {
            name: "due_date",
            kind: ParamType::String,
            format: Some("date"),
            required: false,
            description: "完成日期，格式为YYYY-MM-DD",
        },
    ],
};

static GET_TODOS: OperationSpec = OperationSpec {
    name: "get_todos",
    description: "获取待办事项列表。关键词：显示、查看、列表、所有、全部、未完成、已完成",
    keywords: &["显示", "查看", "列表", "所有", "全部", "未完成", "已完成", "任务"],
    intent_patterns: &[
        r"显示.*任务",
        r"查看.*列表",
        r"所有.*待办",
        r"我的.*任务",
        r"未完成.*",
        r"已完成.*",
    ],
    params: &[ParamSpec {
        name: "completed",
        kind: ParamType::Boolean,
        format: None,
        required: false,
        description: "是否只获取已完成的任务，null表示获取所有任务",
    }],
};

static UPDATE_TODO: OperationSpec = OperationSpec {
    name: "update_todo",
    description: "更新待办事项。关键词：修改、更新、编辑、改变、调整",
    keywords: &["修改", "更新", "编辑", "改变", "调整", "改", "换"],
    intent_patterns: &[r"修改.*任务", r"更新.*", r"改.*标题", r"调整.*"],
    params: &[
        ID_PARAM,
        ParamSpec {
            name: "title",
            kind: ParamType::String,
            format: None,
            required: false,
            description: "新标题",
        },
        ParamSpec {
            name: "content",
            kind: ParamType::String,
            format: None,
            required: false,
            description: "新内容",
        },
        ParamSpec {
            name: "due_date",
            kind: ParamType::String,
            format: Some("date"),
            required: false,
            description: "新完成日期",
        },
        ParamSpec {
            name: "completed",
            kind: ParamType::Boolean,
            format: None,
            required: false,
            description: "是否完成",
        },
    ],
};

static DELETE_TODO: OperationSpec = OperationSpec {
    name: "delete_todo",
    description: "删除待办事项。关键词：删除、移除、清除、去掉、取消",
    keywords: &["删除", "移除", "清除", "去掉", "取消", "删", "除"],
    intent_patterns: &[r"删除.*任务", r"移除.*", r"取消.*"],
    params: &[ID_PARAM],
};

static SEARCH_TODOS: OperationSpec = OperationSpec {
    name: "search_todos",
    description: "搜索待办事项。关键词：搜索、查找、寻找、找",
    keywords: &["搜索", "查找", "寻找", "找", "搜", "包含"],
    intent_patterns: &[r"搜索.*", r"查找.*", r"包含.*的任务", r"找.*相关"],
    params: &[ParamSpec {
        name: "query",
        kind: ParamType::String,
        format: None,
        required: true,
        description: "搜索关键词",
    }],
};

static MARK_COMPLETED: OperationSpec = OperationSpec {
    name: "mark_completed",
    description: "标记待办事项为已完成。关键词：完成、标记、完成了、做完",
    keywords: &["完成", "标记", "完成了", "做完", "finished", "done"],
    intent_patterns: &[r"完成.*任务", r"标记.*完成", r"做完.*", r".*完成了"],
    params: &[ID_PARAM],
};
