use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{BuildviewError, Result};

/// A decoded resource response, checked to be a JSON object.
///
/// Buildbot wraps every resource in an object with a named collection field
/// (`{"builds": [...], "meta": {...}}`). A missing or null field counts as an
/// empty collection; a field of any other non-array type is malformed.
#[derive(Debug)]
pub struct Envelope {
    path: String,
    fields: Map<String, Value>,
}

impl Envelope {
    pub fn parse(path: &str, body: Value) -> Result<Self> {
        match body {
            Value::Object(fields) => Ok(Self {
                path: path.to_string(),
                fields,
            }),
            other => Err(BuildviewError::malformed(
                path,
                format!("expected a JSON object, got {}", type_name(&other)),
            )),
        }
    }

    /// Takes the named collection field, decoded element by element.
    pub fn collection<T: DeserializeOwned>(&mut self, field: &str) -> Result<Vec<T>> {
        self.take_array(field)?
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(BuildviewError::from))
            .collect()
    }

    /// Takes the first element of the named collection field, if any.
    pub fn first<T: DeserializeOwned>(&mut self, field: &str) -> Result<Option<T>> {
        self.take_array(field)?
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()
            .map_err(BuildviewError::from)
    }

    fn take_array(&mut self, field: &str) -> Result<Vec<Value>> {
        match self.fields.remove(field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(BuildviewError::malformed(
                &self.path,
                format!("field '{field}' is {}, not an array", type_name(&other)),
            )),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
