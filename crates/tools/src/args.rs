//! Argument access and coercion shared by the task tools.
//!
//! Every accessor either returns a typed value or a rejection
//! ([`ToolError::InvalidArgument`] / [`ToolError::InvalidArguments`]);
//! tools call them all before touching the store.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use taskpilot_core::error::ToolError;
use taskpilot_core::task::{TaskPriority, TaskStatus};
use crate::due_date;

/// Read-only view over a tool call's JSON arguments.
///
/// `null` arguments behave like `{}`. Fields set to `null` or to a blank
/// string count as absent.
pub struct Args<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Args<'a> {
    pub fn new(arguments: &'a Value) -> Result<Self, ToolError> {
        match arguments {
            Value::Object(map) => Ok(Self { map: Some(map) }),
            Value::Null => Ok(Self { map: None }),
            other => Err(ToolError::InvalidArguments(format!(
                "expected an object, got {other}"
            ))),
        }
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.map
            .and_then(|m| m.get(field))
            .filter(|v| match v {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                _ => true,
            })
    }

    pub fn opt_str(&self, field: &str) -> Result<Option<String>, ToolError> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
            Some(other) => Err(ToolError::invalid(field, display(other))),
        }
    }

    pub fn required_str(&self, field: &str) -> Result<String, ToolError> {
        self.opt_str(field)?
            .ok_or_else(|| ToolError::InvalidArguments(format!("missing required field '{field}'")))
    }

    /// Integer ids; numeric strings and integral floats are accepted too.
    pub fn opt_id(&self, field: &str) -> Result<Option<i64>, ToolError> {
        let Some(value) = self.get(field) else {
            return Ok(None);
        };
        let id = match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        id.map(Some)
            .ok_or_else(|| ToolError::invalid(field, display(value)))
    }

    pub fn required_id(&self, field: &str) -> Result<i64, ToolError> {
        self.opt_id(field)?
            .ok_or_else(|| ToolError::InvalidArguments(format!("missing required field '{field}'")))
    }

    pub fn priority(&self) -> Result<Option<TaskPriority>, ToolError> {
        self.opt_str("priority")?
            .map(|raw| raw.parse().map_err(|bad: String| ToolError::invalid("priority", bad)))
            .transpose()
    }

    pub fn status(&self) -> Result<Option<TaskStatus>, ToolError> {
        self.opt_str("status")?
            .map(|raw| raw.parse().map_err(|bad: String| ToolError::invalid("status", bad)))
            .transpose()
    }

    /// Natural-language due date, resolved relative to `now`.
    pub fn due_date(&self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, ToolError> {
        self.opt_str("due_date")?
            .map(|raw| due_date::parse(&raw, now).ok_or_else(|| ToolError::invalid("due_date", raw)))
            .transpose()
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
