/// Tools Module
///
/// Each tool lives in its own module exporting a `register` function that
/// adds its descriptor and handler to the registry during startup.

pub mod datetime;
pub mod echo;
pub mod hello;
pub mod random;
pub mod rot13;

use crate::core::error::ToolError;
use crate::core::registry::ToolRegistry;

/// Register every built-in tool, in the order they are advertised.
pub fn register_all(registry: &mut ToolRegistry) -> Result<(), ToolError> {
    hello::register(registry)?;
    echo::register(registry)?;
    datetime::register(registry)?;
    random::register(registry)?;
    rot13::register(registry)?;
    Ok(())
}
