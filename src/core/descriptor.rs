/// Tool and Parameter Descriptors
///
/// Descriptors are the static metadata a caller sees when discovering tools:
/// a name, a description and an ordered list of typed parameters. They also
/// drive argument validation, turning the untyped JSON object received at the
/// boundary into typed `Arguments` with defaults applied.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::core::error::{ToolError, ValidationReason};

/// Scalar kinds a parameter may declare.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    String,
    Integer,
    Boolean,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterKind::String => "string",
            ParameterKind::Integer => "integer",
            ParameterKind::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// A validated, typed argument value.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ArgValue {
    String(String),
    Integer(i64),
    Boolean(bool),
}

impl ArgValue {
    pub fn kind(&self) -> ParameterKind {
        match self {
            ArgValue::String(_) => ParameterKind::String,
            ArgValue::Integer(_) => ParameterKind::Integer,
            ArgValue::Boolean(_) => ParameterKind::Boolean,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ArgValue::String(_) => "string",
            ArgValue::Integer(_) => "integer",
            ArgValue::Boolean(_) => "boolean",
        }
    }
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Argument key expected in the call's arguments object
    pub name: String,
    /// Scalar kind the value must have (after coercion)
    pub kind: ParameterKind,
    /// Whether the call fails when the argument is absent
    pub required: bool,
    /// Value used when an optional argument is absent
    pub default: Option<ArgValue>,
    /// Human-readable description shown to callers
    pub description: String,
}

impl ParameterDescriptor {
    pub fn required(name: &str, kind: ParameterKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            default: None,
            description: description.to_string(),
        }
    }

    pub fn optional(name: &str, kind: ParameterKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            default: None,
            description: description.to_string(),
        }
    }

    /// Value substituted when an optional parameter is absent.
    pub fn with_default(mut self, default: ArgValue) -> Self {
        self.default = Some(default);
        self
    }

    fn schema(&self) -> Value {
        let mut schema = serde_json::json!({
            "type": self.kind,
            "description": self.description,
        });
        if let Some(default) = &self.default {
            schema["default"] = serde_json::json!(default);
        }
        schema
    }
}

/// Static metadata describing one tool. Immutable once registered.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    /// Unique tool identifier (e.g., "echo", "rot13")
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// Parameters in declaration order
    pub parameters: Vec<ParameterDescriptor>,
}

impl ToolDescriptor {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Check the descriptor itself is coherent before it enters a registry:
    /// parameter names are unique and every default matches its kind.
    pub fn check(&self) -> Result<(), ToolError> {
        for (index, parameter) in self.parameters.iter().enumerate() {
            if self.parameters[..index]
                .iter()
                .any(|earlier| earlier.name == parameter.name)
            {
                return Err(ToolError::validation(
                    &parameter.name,
                    ValidationReason::OutOfPolicy("parameter declared twice".to_string()),
                ));
            }
            if let Some(default) = &parameter.default {
                if default.kind() != parameter.kind {
                    return Err(ToolError::validation(
                        &parameter.name,
                        ValidationReason::WrongType {
                            expected: parameter.kind,
                            found: default.type_name(),
                        },
                    ));
                }
            }
        }
        Ok(())
    }

    /// JSON Schema for the tool's input, as advertised by `tools/list`.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Validate raw call arguments against the declared parameters.
    ///
    /// Parameters are visited in declaration order and the first violation
    /// is returned. `null` is treated as absent. Arguments the descriptor does
    /// not declare are ignored.
    pub fn validate(&self, raw: &Value, options: &ValidationOptions) -> Result<Arguments, ToolError> {
        let empty = Map::new();
        let object = match raw {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(ToolError::validation(
                    "arguments",
                    ValidationReason::OutOfPolicy(format!(
                        "expected object, found {}",
                        json_type_name(other)
                    )),
                ));
            }
        };

        let mut values = HashMap::with_capacity(self.parameters.len());
        for parameter in &self.parameters {
            match object.get(&parameter.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    let typed = coerce(parameter, value, options)?;
                    values.insert(parameter.name.clone(), typed);
                }
                None if parameter.required => {
                    return Err(ToolError::validation(&parameter.name, ValidationReason::Missing));
                }
                None => {
                    if let Some(default) = &parameter.default {
                        values.insert(parameter.name.clone(), default.clone());
                    }
                }
            }
        }
        Ok(Arguments { values })
    }
}

/// Settings applied uniformly by the validation phase.
#[derive(Debug, Clone, Copy)]
pub struct ValidationOptions {
    /// Accept numeric strings and integral floats for integers, and
    /// `"true"`/`"false"` for booleans.
    pub coerce_scalars: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self { coerce_scalars: true }
    }
}

/// Typed arguments produced by validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: HashMap<String, ArgValue>,
}

impl Arguments {
    /// Raw typed value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// String value of an optional parameter without a default.
    pub fn optional_string(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// String value of `name`; fails if absent or of another kind.
    pub fn string(&self, name: &str) -> Result<&str, ToolError> {
        match self.values.get(name) {
            Some(ArgValue::String(s)) => Ok(s.as_str()),
            Some(other) => Err(mismatch(name, ParameterKind::String, other)),
            None => Err(ToolError::validation(name, ValidationReason::Missing)),
        }
    }

    /// Integer value of `name`; fails if absent or of another kind.
    pub fn integer(&self, name: &str) -> Result<i64, ToolError> {
        match self.values.get(name) {
            Some(ArgValue::Integer(n)) => Ok(*n),
            Some(other) => Err(mismatch(name, ParameterKind::Integer, other)),
            None => Err(ToolError::validation(name, ValidationReason::Missing)),
        }
    }

    /// Boolean value of `name`; fails if absent or of another kind.
    pub fn boolean(&self, name: &str) -> Result<bool, ToolError> {
        match self.values.get(name) {
            Some(ArgValue::Boolean(b)) => Ok(*b),
            Some(other) => Err(mismatch(name, ParameterKind::Boolean, other)),
            None => Err(ToolError::validation(name, ValidationReason::Missing)),
        }
    }
}

fn mismatch(name: &str, expected: ParameterKind, found: &ArgValue) -> ToolError {
    ToolError::validation(
        name,
        ValidationReason::WrongType {
            expected,
            found: found.type_name(),
        },
    )
}

fn coerce(
    parameter: &ParameterDescriptor,
    value: &Value,
    options: &ValidationOptions,
) -> Result<ArgValue, ToolError> {
    let coerced = match (parameter.kind, value) {
        (ParameterKind::String, Value::String(s)) => Some(ArgValue::String(s.clone())),
        (ParameterKind::Integer, Value::Number(n)) => match n.as_i64() {
            Some(i) => Some(ArgValue::Integer(i)),
            None if options.coerce_scalars => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| ArgValue::Integer(f as i64)),
            None => None,
        },
        (ParameterKind::Integer, Value::String(s)) if options.coerce_scalars => {
            s.trim().parse::<i64>().ok().map(ArgValue::Integer)
        }
        (ParameterKind::Boolean, Value::Bool(b)) => Some(ArgValue::Boolean(*b)),
        (ParameterKind::Boolean, Value::String(s)) if options.coerce_scalars => match s.as_str() {
            "true" => Some(ArgValue::Boolean(true)),
            "false" => Some(ArgValue::Boolean(false)),
            _ => None,
        },
        _ => None,
    };
    if coerced.is_none() && parameter.kind == ParameterKind::Integer && out_of_range(value, options) {
        return Err(ToolError::validation(
            &parameter.name,
            ValidationReason::OutOfPolicy("integer out of range".to_string()),
        ));
    }
    coerced.ok_or_else(|| {
        ToolError::validation(
            &parameter.name,
            ValidationReason::WrongType {
                expected: parameter.kind,
                found: json_type_name(value),
            },
        )
    })
}

/// Whole numbers that do not fit in `i64`. Numeric text only counts when
/// coercion is on, since otherwise strings are simply the wrong type.
fn out_of_range(value: &Value, options: &ValidationOptions) -> bool {
    match value {
        Value::Number(n) if n.is_u64() => true,
        Value::Number(n) => n
            .as_f64()
            .is_some_and(|f| f.fract() == 0.0 && (f < i64::MIN as f64 || f >= i64::MAX as f64)),
        Value::String(s) if options.coerce_scalars => {
            let trimmed = s.trim();
            let digits = trimmed.strip_prefix(&['-', '+'][..]).unwrap_or(trimmed);
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        }
        _ => false,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
