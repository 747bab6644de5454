//! Free text -> operation.
//!
//! Two stages, first hit wins:
//! 1. Intent patterns, walked in [`Operation::PATTERN_PRIORITY`] order.
//! 2. Keyword overlap score, walked in catalog order; strict maximum wins.

use regex::{Regex, RegexBuilder};

use super::catalog::Operation;

/// How an operation was chosen for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceSource {
    PatternMatch,
    KeywordScore,
    ModelDecision,
}

impl ConfidenceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PatternMatch => "pattern_match",
            Self::KeywordScore => "keyword_score",
            Self::ModelDecision => "model_decision",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedIntent {
    pub operation: Operation,
    pub source: ConfidenceSource,
}

pub struct IntentClassifier {
    patterns: Vec<(Operation, Vec<Regex>)>,
}

impl IntentClassifier {
    pub fn new() -> Self {
        let patterns = Operation::PATTERN_PRIORITY
            .iter()
            .map(|&op| {
                let compiled = op
                    .spec()
                    .intent_patterns
                    .iter()
                    .map(|p| {
                        RegexBuilder::new(p)
                            .case_insensitive(true)
                            .build()
                            .expect("intent pattern must compile")
                    })
                    .collect();
                (op, compiled)
            })
            .collect();
        Self { patterns }
    }

    /// Best-matching operation, or `None` when the intent is unresolved.
    pub fn classify(&self, text: &str) -> Option<Operation> {
        self.classify_detailed(text).map(|intent| intent.operation)
    }

    pub fn classify_detailed(&self, text: &str) -> Option<ParsedIntent> {
        if let Some(operation) = self.match_patterns(text) {
            return Some(ParsedIntent {
                operation,
                source: ConfidenceSource::PatternMatch,
            });
        }

        self.score_keywords(text).map(|operation| ParsedIntent {
            operation,
            source: ConfidenceSource::KeywordScore,
        })
    }

    fn match_patterns(&self, text: &str) -> Option<Operation> {
        self.patterns
            .iter()
            .find(|(_, regexes)| regexes.iter().any(|re| re.is_match(text)))
            .map(|(op, _)| *op)
    }

    fn score_keywords(&self, text: &str) -> Option<Operation> {
        let lowered = text.to_lowercase();
        let mut best: Option<(Operation, usize)> = None;

        for op in Operation::ALL {
            let score = op
                .spec()
                .keywords
                .iter()
                .filter(|kw| lowered.contains(**kw))
                .count();
            // Ties keep the earlier operation.
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((op, score));
            }
        }

        best.map(|(op, _)| op)
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}
