/// Random Number Tool
///
/// Draws a uniformly distributed integer in `[origin, bound)` from the shared
/// secure generator held in the tool context.

use serde_json::Value;

use crate::core::context::ToolContext;
use crate::core::descriptor::{
    ArgValue, Arguments, ParameterDescriptor, ParameterKind, ToolDescriptor,
};
use crate::core::error::ToolError;
use crate::core::registry::ToolRegistry;

pub const NAME: &str = "random-number";

pub fn register(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    let tool = ToolDescriptor::new(NAME, "Provides a random number in the range [origin, bound).")
        .with_parameter(
            ParameterDescriptor::optional("origin", ParameterKind::Integer, "Origin, the first possible value")
                .with_default(ArgValue::Integer(0)),
        )
        .with_parameter(
            ParameterDescriptor::optional("bound", ParameterKind::Integer, "Bound, the exclusive upper limit")
                .with_default(ArgValue::Integer(10)),
        );
    registry.register(tool, execute)
}

fn execute(ctx: &ToolContext, args: &Arguments) -> Result<Value, ToolError> {
    let origin = args.integer("origin")?;
    let bound = args.integer("bound")?;
    if origin >= bound {
        return Err(ToolError::InvalidRange { origin, bound });
    }
    Ok(Value::from(ctx.rng.in_range(origin, bound)))
}
