/// Echo Tool Implementation
///
/// Returns the `value` argument exactly as received: no trimming, no
/// normalization, non-ASCII content untouched.

use serde_json::Value;

use crate::core::context::ToolContext;
use crate::core::descriptor::{Arguments, ParameterDescriptor, ParameterKind, ToolDescriptor};
use crate::core::error::ToolError;
use crate::core::registry::ToolRegistry;

pub const NAME: &str = "echo";

/// Register the echo tool with the tool registry.
pub fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    let tool = ToolDescriptor::new(NAME, "Echoes back the provided value unchanged.").with_parameter(
        ParameterDescriptor::required("value", ParameterKind::String, "Value to be echoed"),
    );
    registry.register(tool, execute)
}

fn execute(_ctx: &ToolContext, args: &Arguments) -> Result<Value, ToolError> {
    Ok(Value::String(args.string("value")?.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::InvocationResult;
    use serde_json::json;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new(ToolContext::default());
        register(&mut registry).unwrap();
        registry
    }

    #[test]
    fn echoes_empty_string() {
        assert_eq!(
            registry().invoke(NAME, &json!({"value": ""})),
            InvocationResult::Success { value: json!("") }
        );
    }

    #[test]
    fn leaves_non_ascii_and_whitespace_alone() {
        let registry = registry();
        for input in ["café🙂", "  padded  ", "line\nbreak"] {
            assert_eq!(
                registry.invoke(NAME, &json!({ "value": input })),
                InvocationResult::Success { value: json!(input) }
            );
        }
    }

    #[test]
    fn requires_value() {
        let result = registry().invoke(NAME, &json!({}));
        assert!(matches!(
            result,
            InvocationResult::Failure { ref message, .. } if message == "invalid parameter 'value': missing required parameter"
        ));
    }
}
