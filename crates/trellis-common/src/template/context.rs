//! Template context for boot data rendering
//!
//! A flat mapping of named booleans and strings, built immediately before a
//! render and discarded after it. Keys are kept in a `BTreeMap` so the value
//! handed to the engine is identical across renders of the same input.

use minijinja::Value;
use std::collections::BTreeMap;

/// A single context value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextValue {
    /// Boolean flag, usable in `{% if %}` blocks
    Bool(bool),
    /// String value, usable in `{{ ... }}` expressions
    String(String),
}

impl ContextValue {
    fn to_value(&self) -> Value {
        match self {
            Self::Bool(b) => Value::from(*b),
            Self::String(s) => Value::from(s.as_str()),
        }
    }
}

/// Template context containing all values available for expansion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: BTreeMap<String, ContextValue>,
}

impl TemplateContext {
    /// Create a new builder for TemplateContext
    pub fn builder() -> TemplateContextBuilder {
        TemplateContextBuilder::default()
    }

    /// Look up a value by name
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    /// Number of values in the context
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context has no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Convert to minijinja Value for rendering
    pub fn to_value(&self) -> Value {
        Value::from_iter(
            self.values
                .iter()
                .map(|(key, value)| (key.clone(), value.to_value())),
        )
    }
}

/// Builder for TemplateContext
#[derive(Debug, Default)]
pub struct TemplateContextBuilder {
    values: BTreeMap<String, ContextValue>,
}

impl TemplateContextBuilder {
    /// Add a boolean value
    pub fn bool(mut self, key: impl Into<String>, value: bool) -> Self {
        self.values.insert(key.into(), ContextValue::Bool(value));
        self
    }

    /// Add a string value
    pub fn string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .insert(key.into(), ContextValue::String(value.into()));
        self
    }

    /// Build the TemplateContext
    pub fn build(self) -> TemplateContext {
        TemplateContext {
            values: self.values,
        }
    }
}
