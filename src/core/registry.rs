/// Tool Registry and Invocation Contract
///
/// The registry keeps every registered tool in registration order for
/// discovery, plus a name index for lookup during invocation. A call goes
/// through two phases on the tool's handler: `validate` turns the raw JSON
/// arguments into typed `Arguments`, then `execute` runs the tool. Any
/// failure is reported as `InvocationResult::Failure`; nothing in this path
/// panics on caller input.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::core::context::ToolContext;
use crate::core::descriptor::{Arguments, ToolDescriptor, ValidationOptions};
use crate::core::error::{ErrorKind, ToolError};

/// Executable behavior bound to a descriptor.
///
/// The default `validate` checks arguments against the descriptor. Handlers
/// with extra input rules override it and call `descriptor.validate` first,
/// so every rejection happens before `execute` runs.
pub trait ToolHandler: Send + Sync {
    fn validate(
        &self,
        descriptor: &ToolDescriptor,
        arguments: &Value,
        options: &ValidationOptions,
    ) -> Result<Arguments, ToolError> {
        descriptor.validate(arguments, options)
    }

    fn execute(&self, ctx: &ToolContext, arguments: &Arguments) -> Result<Value, ToolError>;
}

/// Plain functions and closures are handlers using the default validation.
impl<F> ToolHandler for F
where
    F: Fn(&ToolContext, &Arguments) -> Result<Value, ToolError> + Send + Sync,
{
    fn execute(&self, ctx: &ToolContext, arguments: &Arguments) -> Result<Value, ToolError> {
        self(ctx, arguments)
    }
}

/// A single call as received from a transport.
#[derive(Deserialize, Debug, Clone)]
pub struct InvocationRequest {
    /// Name of the tool to call
    #[serde(rename = "name", default)]
    pub tool_name: String,
    /// Raw arguments object; absent means no arguments
    #[serde(default)]
    pub arguments: Value,
}

/// Outcome of one invocation.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvocationResult {
    Success { value: Value },
    Failure { kind: ErrorKind, message: String },
}

impl InvocationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationResult::Success { .. })
    }
}

impl From<Result<Value, ToolError>> for InvocationResult {
    fn from(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(value) => InvocationResult::Success { value },
            Err(e) => InvocationResult::Failure {
                kind: e.kind(),
                message: e.to_string(),
            },
        }
    }
}

struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Box<dyn ToolHandler>,
}

/// Registry of available tools.
///
/// Built once during startup and shared read-only afterwards, so lookups
/// from concurrent invocations need no locking.
pub struct ToolRegistry {
    /// Tools in registration order (for discovery)
    tools: Vec<RegisteredTool>,
    /// Tool name to position in `tools` (for invocation)
    index: HashMap<String, usize>,
    context: ToolContext,
}

impl ToolRegistry {
    /// Create an empty registry whose handlers will share `context`.
    pub fn new(context: ToolContext) -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
            context,
        }
    }

    /// Register a tool.
    ///
    /// Names are unique: a second registration under an existing name is
    /// rejected with `DuplicateTool` and leaves the registry unchanged.
    ///
    /// # Arguments
    /// * `descriptor` - Tool metadata: name, description and parameters
    /// * `handler` - Validation and execution logic bound to the descriptor
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: impl ToolHandler + 'static,
    ) -> Result<(), ToolError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(ToolError::DuplicateTool(descriptor.name));
        }
        descriptor.check()?;

        tracing::debug!(tool = %descriptor.name, "registered tool");
        self.index.insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            descriptor,
            handler: Box::new(handler),
        });
        Ok(())
    }

    /// All registered descriptors, in registration order.
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        self.tools.iter().map(|t| &t.descriptor).collect()
    }

    /// Descriptor registered under `name`, if any.
    pub fn descriptor(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.tools[i].descriptor)
    }

    /// Whether a tool named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up `name` and run its validate-then-execute pipeline.
    pub fn invoke(&self, name: &str, arguments: &Value) -> InvocationResult {
        let result = self.run(name, arguments);

        if self.context.audit {
            match &result {
                Ok(_) => tracing::info!(target: "audit", tool = name, outcome = "success", "tool invoked"),
                Err(e) => tracing::info!(
                    target: "audit",
                    tool = name,
                    outcome = ?e.kind(),
                    error = %e,
                    "tool invocation failed"
                ),
            }
        }

        result.into()
    }

    /// Invoke the tool named by a transport-level request.
    pub fn invoke_request(&self, request: &InvocationRequest) -> InvocationResult {
        self.invoke(&request.tool_name, &request.arguments)
    }

    fn run(&self, name: &str, arguments: &Value) -> Result<Value, ToolError> {
        let tool = self
            .index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let validated = tool
            .handler
            .validate(&tool.descriptor, arguments, &self.context.options)?;
        tool.handler.execute(&self.context, &validated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::{ParameterDescriptor, ParameterKind};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn upper(_ctx: &ToolContext, args: &Arguments) -> Result<Value, ToolError> {
        Ok(json!(args.string("text")?.to_uppercase()))
    }

    fn upper_descriptor(name: &str) -> ToolDescriptor {
        ToolDescriptor::new(name, "uppercase text")
            .with_parameter(ParameterDescriptor::required("text", ParameterKind::String, "text"))
    }

    struct Counting(Arc<AtomicUsize>);

    impl ToolHandler for Counting {
        fn execute(&self, _ctx: &ToolContext, _arguments: &Arguments) -> Result<Value, ToolError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Null)
        }
    }

    #[test]
    fn invoke_runs_registered_handler() {
        let mut registry = ToolRegistry::new(ToolContext::default());
        registry.register(upper_descriptor("upper"), upper).unwrap();

        let result = registry.invoke("upper", &json!({"text": "abc"}));
        assert_eq!(result, InvocationResult::Success { value: json!("ABC") });
    }

    #[test]
    fn duplicate_registration_is_rejected_and_keeps_first() {
        let mut registry = ToolRegistry::new(ToolContext::default());
        registry.register(upper_descriptor("upper"), upper).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let err = registry
            .register(upper_descriptor("upper"), Counting(calls.clone()))
            .unwrap_err();
        assert_eq!(err, ToolError::DuplicateTool("upper".to_string()));
        assert_eq!(registry.len(), 1);

        registry.invoke("upper", &json!({"text": "a"}));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn list_keeps_registration_order() {
        let mut registry = ToolRegistry::new(ToolContext::default());
        for name in ["zeta", "alpha", "mid"] {
            registry.register(upper_descriptor(name), upper).unwrap();
        }
        let names: Vec<&str> = registry.list().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);

        let again: Vec<&str> = registry.list().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, again);
    }

    #[test]
    fn unknown_tool_fails_without_touching_registry() {
        let mut registry = ToolRegistry::new(ToolContext::default());
        registry.register(upper_descriptor("upper"), upper).unwrap();

        let result = registry.invoke("missing", &json!({}));
        match result {
            InvocationResult::Failure { kind, message } => {
                assert_eq!(kind, ErrorKind::UnknownTool);
                assert_eq!(message, "unknown tool: missing");
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("upper"));
        assert!(!registry.contains("missing"));
    }

    #[test]
    fn validation_failure_skips_execution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new(ToolContext::default());
        registry
            .register(upper_descriptor("count"), Counting(calls.clone()))
            .unwrap();

        let result = registry.invoke("count", &json!({"text": 5}));
        assert!(matches!(
            result,
            InvocationResult::Failure { kind: ErrorKind::Validation, .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(registry.invoke("count", &json!({"text": "ok"})).is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn incoherent_descriptor_is_not_registered() {
        let mut registry = ToolRegistry::new(ToolContext::default());
        let descriptor = upper_descriptor("bad")
            .with_parameter(ParameterDescriptor::required("text", ParameterKind::String, "again"));
        assert!(registry.register(descriptor, upper).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn request_deserializes_from_tools_call_params() {
        let request: InvocationRequest =
            serde_json::from_value(json!({"name": "upper", "arguments": {"text": "q"}})).unwrap();
        let mut registry = ToolRegistry::new(ToolContext::default());
        registry.register(upper_descriptor("upper"), upper).unwrap();
        assert_eq!(
            registry.invoke_request(&request),
            InvocationResult::Success { value: json!("Q") }
        );
    }

    #[test]
    fn result_serializes_with_status_tag() {
        let ok: InvocationResult = Ok(json!(3)).into();
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"status": "success", "value": 3}));

        let failed: InvocationResult = Err(ToolError::InvalidRange { origin: 5, bound: 5 }).into();
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({
                "status": "failure",
                "kind": "invalid_range",
                "message": "invalid range: origin 5 must be less than bound 5"
            })
        );
    }

    #[test]
    fn concurrent_invocations_share_registry() {
        let mut registry = ToolRegistry::new(ToolContext::default());
        registry.register(upper_descriptor("upper"), upper).unwrap();
        let registry = Arc::new(registry);

        std::thread::scope(|scope| {
            for i in 0..8 {
                let registry = registry.clone();
                scope.spawn(move || {
                    let text = format!("t{}", i);
                    let result = registry.invoke("upper", &json!({ "text": text }));
                    assert_eq!(result, InvocationResult::Success { value: json!(format!("T{}", i)) });
                    assert!(!registry.invoke("nope", &json!({})).is_success());
                });
            }
        });
        assert_eq!(registry.len(), 1);
    }
}
