// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Choice rules evaluated against the payload

use crate::payload::JsonPath;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceRule {
    /// The path resolves to a value (including `null`)
    IsPresent(JsonPath),
    /// The path resolves to a string matching a `*` wildcard pattern
    StringMatches { path: JsonPath, pattern: String },
    And(Vec<ChoiceRule>),
    Not(Box<ChoiceRule>),
}

impl ChoiceRule {
    pub fn evaluate(&self, input: &Value) -> bool {
        match self {
            ChoiceRule::IsPresent(path) => path.get(input).is_some(),
            ChoiceRule::StringMatches { path, pattern } => path
                .get(input)
                .and_then(Value::as_str)
                .is_some_and(|s| wildcard_match(pattern, s)),
            ChoiceRule::And(rules) => rules.iter().all(|r| r.evaluate(input)),
            ChoiceRule::Not(rule) => !rule.evaluate(input),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ChoiceRule::IsPresent(path) => {
                serde_json::json!({ "Variable": path.to_string(), "IsPresent": true })
            }
            ChoiceRule::StringMatches { path, pattern } => {
                serde_json::json!({ "Variable": path.to_string(), "StringMatches": pattern })
            }
            ChoiceRule::And(rules) => {
                serde_json::json!({ "And": rules.iter().map(ChoiceRule::to_json).collect::<Vec<_>>() })
            }
            ChoiceRule::Not(rule) => serde_json::json!({ "Not": rule.to_json() }),
        }
    }
}

/// Match `text` against a pattern where `*` stands for any run of characters
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    let [first, middle @ .., last] = parts.as_slice() else {
        // No wildcard at all
        return pattern == text;
    };

    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };
    for part in middle {
        match rest.find(part) {
            Some(index) => rest = &rest[index + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}

#[cfg(test)]
#[path = "choice_tests.rs"]
mod tests;
