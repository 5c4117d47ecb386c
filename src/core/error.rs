/// Invocation Error Taxonomy
///
/// Every way a tool call can fail is a variant of `ToolError`. Errors never
/// escape the registry as panics; they are folded into an
/// `InvocationResult::Failure` carrying the `ErrorKind` and display message.

use serde::Serialize;
use std::fmt;

use crate::core::descriptor::ParameterKind;

/// Machine-readable classification of a failed invocation.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownTool,
    DuplicateTool,
    Validation,
    InvalidTimeZone,
    InvalidRange,
    InvalidCharacter,
}

/// Why a single parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    /// Required parameter was absent (or `null`).
    Missing,
    /// Value could not be read as the declared kind.
    WrongType {
        expected: ParameterKind,
        found: &'static str,
    },
    /// Value had the right shape but breaks a tool-specific rule.
    OutOfPolicy(String),
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReason::Missing => write!(f, "missing required parameter"),
            ValidationReason::WrongType { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            ValidationReason::OutOfPolicy(msg) => write!(f, "{}", msg),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("duplicate tool: {0}")]
    DuplicateTool(String),
    #[error("invalid parameter '{parameter}': {reason}")]
    Validation {
        parameter: String,
        reason: ValidationReason,
    },
    #[error("invalid time zone: {0}")]
    InvalidTimeZone(String),
    #[error("invalid range: origin {origin} must be less than bound {bound}")]
    InvalidRange { origin: i64, bound: i64 },
    #[error("invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },
}

impl ToolError {
    pub fn validation(parameter: impl Into<String>, reason: ValidationReason) -> Self {
        ToolError::Validation {
            parameter: parameter.into(),
            reason,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::UnknownTool(_) => ErrorKind::UnknownTool,
            ToolError::DuplicateTool(_) => ErrorKind::DuplicateTool,
            ToolError::Validation { .. } => ErrorKind::Validation,
            ToolError::InvalidTimeZone(_) => ErrorKind::InvalidTimeZone,
            ToolError::InvalidRange { .. } => ErrorKind::InvalidRange,
            ToolError::InvalidCharacter { .. } => ErrorKind::InvalidCharacter,
        }
    }
}
