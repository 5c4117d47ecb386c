/// MCP Example Tools
///
/// A registry of small named tools (echo, current date/time, random numbers,
/// ROT13, hello world) with typed parameter descriptors, exposed to MCP
/// clients over STDIO and HTTP.

pub mod core;
pub mod tools;

pub use crate::core::context::ToolContext;
pub use crate::core::descriptor::{ArgValue, Arguments, ParameterDescriptor, ParameterKind, ToolDescriptor};
pub use crate::core::error::{ErrorKind, ToolError};
pub use crate::core::registry::{InvocationRequest, InvocationResult, ToolHandler, ToolRegistry};
