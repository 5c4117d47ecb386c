/// ROT13 Tool
///
/// Rotates ASCII letters by 13 places. Input is restricted to printable
/// ASCII (32..=126); the whole string is checked during validation, so a bad
/// character anywhere rejects the call before any text is transformed.

use serde_json::Value;

use crate::core::context::ToolContext;
use crate::core::descriptor::{
    Arguments, ParameterDescriptor, ParameterKind, ToolDescriptor, ValidationOptions,
};
use crate::core::error::ToolError;
use crate::core::registry::{ToolHandler, ToolRegistry};

pub const NAME: &str = "rot13";

const PARAM: &str = "value";

pub fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    let tool = ToolDescriptor::new(
        NAME,
        "Applies the ROT13 letter substitution to printable ASCII text.",
    )
    .with_parameter(ParameterDescriptor::required(
        PARAM,
        ParameterKind::String,
        "Printable ASCII text (characters 32 to 126) to transform",
    ));
    registry.register(tool, Rot13)
}

struct Rot13;

impl ToolHandler for Rot13 {
    fn validate(
        &self,
        descriptor: &ToolDescriptor,
        arguments: &Value,
        options: &ValidationOptions,
    ) -> Result<Arguments, ToolError> {
        let validated = descriptor.validate(arguments, options)?;
        check_printable(validated.string(PARAM)?)?;
        Ok(validated)
    }

    fn execute(&self, _ctx: &ToolContext, arguments: &Arguments) -> Result<Value, ToolError> {
        Ok(Value::String(rot13(arguments.string(PARAM)?)))
    }
}

/// First character outside printable ASCII, with its 0-based character position.
fn check_printable(input: &str) -> Result<(), ToolError> {
    match input.chars().enumerate().find(|(_, c)| !matches!(c, ' '..='~')) {
        Some((position, character)) => Err(ToolError::InvalidCharacter { character, position }),
        None => Ok(()),
    }
}

fn rot13(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'a'..='z' => rotate(c, b'a'),
            'A'..='Z' => rotate(c, b'A'),
            _ => c,
        })
        .collect()
}

fn rotate(c: char, base: u8) -> char {
    (((c as u8 - base + 13) % 26) + base) as char
}
