// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution payload addressing
//!
//! Payloads are plain JSON values. States address fields with a restricted
//! JSONPath (`$` followed by dotted object keys) and merge their results in
//! with a [`ResultPath`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Errors from parsing a path expression
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("path must start with '$': {0}")]
    MissingRoot(String),
    #[error("empty segment in path: {0}")]
    EmptySegment(String),
}

/// A dotted object path rooted at `$`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JsonPath {
    segments: Vec<String>,
}

impl JsonPath {
    /// The root path `$`
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn parse(expr: &str) -> Result<Self, PathError> {
        let rest = expr
            .strip_prefix('$')
            .ok_or_else(|| PathError::MissingRoot(expr.to_string()))?;
        if rest.is_empty() {
            return Ok(Self::root());
        }
        let rest = rest
            .strip_prefix('.')
            .ok_or_else(|| PathError::EmptySegment(expr.to_string()))?;

        let mut segments = Vec::new();
        for segment in rest.split('.') {
            if segment.is_empty() {
                return Err(PathError::EmptySegment(expr.to_string()));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Extend this path by one key
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Look up the value at this path
    pub fn get<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(value, |current, key| current.as_object()?.get(key))
    }

    /// Write `new` at this path, creating intermediate objects as needed
    ///
    /// Any non-object value found along the way is replaced by an object.
    pub fn set(&self, value: &mut Value, new: Value) {
        set_in(value, &self.segments, new);
    }

    /// Remove and return the value at this path
    pub fn remove(&self, value: &mut Value) -> Option<Value> {
        let (last, parents) = self.segments.split_last()?;
        let mut current = value;
        for key in parents {
            current = current.as_object_mut()?.get_mut(key)?;
        }
        current.as_object_mut()?.remove(last)
    }
}

fn set_in(value: &mut Value, segments: &[String], new: Value) {
    let Some((key, rest)) = segments.split_first() else {
        *value = new;
        return;
    };
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    if let Value::Object(map) = value {
        set_in(map.entry(key.clone()).or_insert(Value::Null), rest, new);
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for JsonPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<JsonPath> for String {
    fn from(path: JsonPath) -> Self {
        path.to_string()
    }
}

/// Where a state places its result in the payload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultPath {
    /// Drop the result and pass the input through unchanged
    Discard,
    /// Replace the whole payload with the result
    #[default]
    Replace,
    /// Write the result at the given path, keeping the rest of the input
    At(JsonPath),
}

impl ResultPath {
    pub fn at(path: JsonPath) -> Self {
        if path.is_root() {
            ResultPath::Replace
        } else {
            ResultPath::At(path)
        }
    }

    /// Merge a state result into its input
    pub fn apply(&self, mut input: Value, result: Value) -> Value {
        match self {
            ResultPath::Discard => input,
            ResultPath::Replace => result,
            ResultPath::At(path) => {
                path.set(&mut input, result);
                input
            }
        }
    }

    /// Rendered form used in workflow definitions (`null` discards)
    pub fn to_json(&self) -> Value {
        match self {
            ResultPath::Discard => Value::Null,
            ResultPath::Replace => Value::String("$".to_string()),
            ResultPath::At(path) => Value::String(path.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
