//! Per-item parameter access.
//!
//! The host engine hands each item its declared parameter values. Values may
//! carry Handlebars expressions (`{{ json.email }}`) that are resolved against
//! the item being processed. A rendered expression is always text; the typed
//! readers coerce it when a number, flag or array is asked for.

use crate::error::{NylasError, Result};
use handlebars::Handlebars;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Supplies the declared value of a parameter for one item.
pub trait ParamSource {
    /// Returns `None` when the parameter was not declared for this item.
    fn get_param(&self, name: &str, item_index: usize) -> Result<Option<Value>>;
}

/// Declared node parameters resolved against a batch of input items.
#[derive(Debug)]
pub struct NodeParameters {
    /// Declared values, possibly containing templates
    parameters: HashMap<String, Value>,

    /// Input items, exposed to templates as `json`
    items: Vec<Value>,

    handlebars: Handlebars<'static>,
}

impl NodeParameters {
    pub fn new(parameters: HashMap<String, Value>, items: Vec<Value>) -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(handlebars::no_escape);

        Self {
            parameters,
            items,
            handlebars,
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Resolve a value for one item, expanding any templates.
    pub fn resolve(&self, value: &Value, item_index: usize) -> Result<Value> {
        match value {
            Value::Object(map) => {
                let mut result = Map::new();
                for (k, v) in map {
                    result.insert(k.clone(), self.resolve(v, item_index)?);
                }
                Ok(Value::Object(result))
            }
            Value::Array(arr) => {
                let resolved: Result<Vec<Value>> =
                    arr.iter().map(|v| self.resolve(v, item_index)).collect();
                Ok(Value::Array(resolved?))
            }
            Value::String(s) if s.contains("{{") && s.contains("}}") => {
                self.render_template(s, item_index)
            }
            _ => Ok(value.clone()),
        }
    }

    fn render_template(&self, template: &str, item_index: usize) -> Result<Value> {
        let item = self.items.get(item_index).cloned().unwrap_or(Value::Null);
        let data = serde_json::json!({
            "json": item,
            "itemIndex": item_index,
        });

        self.handlebars
            .render_template(template, &data)
            .map(Value::String)
            .map_err(|e| NylasError::operation(format!("Failed to render expression: {e}")))
    }
}

impl ParamSource for NodeParameters {
    fn get_param(&self, name: &str, item_index: usize) -> Result<Option<Value>> {
        match self.parameters.get(name) {
            Some(value) => self.resolve(value, item_index).map(Some),
            None => Ok(None),
        }
    }
}

/// Typed reads of one item's parameters, applying defaults.
pub struct ParamReader<'a, S: ParamSource + ?Sized> {
    source: &'a S,
    item_index: usize,
}

impl<'a, S: ParamSource + ?Sized> ParamReader<'a, S> {
    pub fn new(source: &'a S, item_index: usize) -> Self {
        Self { source, item_index }
    }

    pub fn item_index(&self) -> usize {
        self.item_index
    }

    fn raw(&self, name: &str) -> Result<Option<Value>> {
        let value = self.source.get_param(name, self.item_index)?;
        Ok(value.filter(|v| !v.is_null()))
    }

    /// A required string parameter.
    pub fn string(&self, name: &str) -> Result<String> {
        match self.raw(name)? {
            Some(value) => as_string(name, value),
            None => Err(missing(name)),
        }
    }

    pub fn string_or(&self, name: &str, default: &str) -> Result<String> {
        match self.raw(name)? {
            Some(value) => as_string(name, value),
            None => Ok(default.to_string()),
        }
    }

    /// A required integer parameter.
    pub fn i64(&self, name: &str) -> Result<i64> {
        match self.raw(name)? {
            Some(value) => as_i64(name, &value),
            None => Err(missing(name)),
        }
    }

    pub fn i64_or(&self, name: &str, default: i64) -> Result<i64> {
        match self.raw(name)? {
            Some(value) => as_i64(name, &value),
            None => Ok(default),
        }
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool> {
        match self.raw(name)? {
            Some(Value::Bool(b)) => Ok(b),
            Some(Value::String(s)) if s == "true" || s == "false" => Ok(s == "true"),
            Some(_) => Err(wrong_type(name, "boolean")),
            None => Ok(default),
        }
    }

    /// A JSON array parameter, given either as an array or as JSON text.
    pub fn json_array<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let value = match self.raw(name)? {
            None => return Ok(Vec::new()),
            Some(Value::String(text)) if text.trim().is_empty() => return Ok(Vec::new()),
            Some(Value::String(text)) => serde_json::from_str::<Value>(&text).map_err(|e| {
                NylasError::operation(format!("parameter '{name}' is not valid JSON: {e}"))
            })?,
            Some(value) => value,
        };

        match value {
            Value::Array(_) => serde_json::from_value(value).map_err(|e| {
                NylasError::operation(format!("parameter '{name}' has an invalid entry: {e}"))
            }),
            _ => Err(wrong_type(name, "JSON array")),
        }
    }

    /// A fixed collection: `{ "<entry>": [...] }` or a bare array.
    pub fn collection<T: DeserializeOwned>(&self, name: &str, entry: &str) -> Result<Vec<T>> {
        let value = match self.raw(name)? {
            None => return Ok(Vec::new()),
            Some(Value::String(text)) if text.trim().is_empty() => return Ok(Vec::new()),
            Some(Value::String(text)) => serde_json::from_str::<Value>(&text).map_err(|e| {
                NylasError::operation(format!("parameter '{name}' is not valid JSON: {e}"))
            })?,
            Some(value) => value,
        };

        let entries = match value {
            Value::Object(mut map) => map.remove(entry).unwrap_or(Value::Array(Vec::new())),
            value @ Value::Array(_) => value,
            _ => return Err(wrong_type(name, "collection")),
        };

        if entries.is_null() {
            return Ok(Vec::new());
        }

        serde_json::from_value(entries).map_err(|e| {
            NylasError::operation(format!("parameter '{name}' has an invalid entry: {e}"))
        })
    }
}

fn missing(name: &str) -> NylasError {
    NylasError::operation(format!("missing required parameter '{name}'"))
}

fn wrong_type(name: &str, expected: &str) -> NylasError {
    NylasError::operation(format!("parameter '{name}' must be a {expected}"))
}

fn as_string(name: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(wrong_type(name, "string")),
    }
}

fn as_i64(name: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(|| wrong_type(name, "whole number")),
        Value::String(s) => s.trim().parse().map_err(|_| wrong_type(name, "whole number")),
        _ => Err(wrong_type(name, "whole number")),
    }
}
