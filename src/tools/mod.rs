use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::gemini::{FunctionDeclaration, ToolDeclaration};

pub mod stock_price;

pub use stock_price::StockPriceTool;

/// A deterministic external-data function an agent may invoke during
/// generation. Failures come back as text in the returned string, never as
/// an error: the agent consumes tool failures as content.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema of the argument object, sent with the tool declaration.
    fn parameters(&self) -> Value;
    async fn invoke(&self, args: &Value) -> String;
}

/// Maps tool name to implementation, resolved once at agent construction.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Declarations to advertise to the backend; empty for a plain agent.
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        let mut declarations: Vec<ToolDeclaration> = self
            .tools
            .values()
            .map(|tool| ToolDeclaration {
                decl_type: "function".to_string(),
                function: FunctionDeclaration {
                    name: tool.name().to_string(),
                    description: tool.description().to_string(),
                    parameters: tool.parameters(),
                },
            })
            .collect();
        declarations.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        declarations
    }
}
