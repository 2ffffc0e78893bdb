use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::tools::{StockPriceTool, ToolRegistry};
use crate::types::Task;

use super::Agent;

/// Research stage: the only agent in the pipeline with tool access, so at
/// most one price lookup is attributable per run.
pub fn build(config: &Config, client: GeminiClient) -> Result<Agent> {
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(StockPriceTool::new(config)?));

    Ok(Agent::new(
        "Senior Stock Market Researcher",
        "Find live stock prices",
        "Expert analyst who uses tools to find data.",
        client,
    )
    .with_tools(tools))
}

pub fn research_task(ticker: &str) -> Task {
    Task::new(
        format!("Find the LIVE price of '{}' using the tool.", ticker),
        "A report with the exact LIVE price.",
    )
}
