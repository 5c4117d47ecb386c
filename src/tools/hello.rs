/// Hello World Tool
///
/// Takes no parameters and returns a fixed greeting. Useful as a smoke test
/// for a client's discovery and call path.

use serde_json::Value;

use crate::core::context::ToolContext;
use crate::core::descriptor::{Arguments, ToolDescriptor};
use crate::core::error::ToolError;
use crate::core::registry::ToolRegistry;

pub const NAME: &str = "hello-world";

pub const GREETING: &str = "Hello, World!";

pub fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    let tool = ToolDescriptor::new(NAME, "Just returns a Hello world.");
    registry.register(tool, |_ctx: &ToolContext, _args: &Arguments| -> Result<Value, ToolError> {
        Ok(Value::from(GREETING))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::InvocationResult;
    use serde_json::json;

    #[test]
    fn greets_and_ignores_arguments() {
        let mut registry = ToolRegistry::new(ToolContext::default());
        register(&mut registry).unwrap();

        for args in [json!({}), Value::Null, json!({"extra": 1})] {
            assert_eq!(
                registry.invoke(NAME, &args),
                InvocationResult::Success { value: json!(GREETING) }
            );
        }
        assert_eq!(registry.descriptor(NAME).unwrap().input_schema()["required"], json!([]));
    }
}
