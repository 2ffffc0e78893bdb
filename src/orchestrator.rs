use anyhow::Result;
use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::agents::{self, Agent, AgentError};
use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::types::{PipelineContext, Task};

/// One pipeline stage: a task bound to exactly one agent.
pub struct Stage {
    pub agent: Agent,
    pub task: Task,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running(usize),
    Completed,
    Failed,
}

/// Executes an ordered list of stages, threading each completed task's
/// output forward as context for every later task. Run-scoped: carries the
/// per-run context as its only state, so concurrent runs each construct
/// their own orchestrator.
pub struct Orchestrator {
    run_id: Uuid,
    stages: Vec<Stage>,
    context: PipelineContext,
    state: RunState,
}

impl Orchestrator {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            stages,
            context: PipelineContext::new(),
            state: RunState::Idle,
        }
    }

    /// Wire up the two-stage analyst pipeline for one ticker:
    /// Researcher (tool-enabled) → Writer. Fails before any network call
    /// when the credential is missing.
    pub fn for_ticker(config: Config, ticker: &str) -> Result<Self> {
        let ticker = ticker.trim();
        let client = GeminiClient::new(config.clone())?;

        let stages = vec![
            Stage {
                agent: agents::researcher::build(&config, client.clone())?,
                task: agents::researcher::research_task(ticker),
            },
            Stage {
                agent: agents::writer::build(client),
                task: agents::writer::writing_task(ticker),
            },
        ];
        Ok(Self::new(stages))
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Run every stage in order. All-or-nothing: any fault abandons the run
    /// and nothing partial is returned.
    pub async fn run(&mut self) -> Result<String, AgentError> {
        let started = Utc::now();
        info!(run_id = %self.run_id, "Pipeline mode: {} stages, sequential", self.stages.len());

        for index in 0..self.stages.len() {
            self.state = RunState::Running(index);
            info!(
                run_id = %self.run_id,
                "Stage {} ({}): processing",
                index + 1,
                self.stages[index].agent.role()
            );

            let outcome = {
                let stage = &self.stages[index];
                stage.agent.resolve(&stage.task, &self.context).await
            };
            match outcome {
                Ok(output) => {
                    info!(
                        run_id = %self.run_id,
                        "Stage {} ({}): completed",
                        index + 1,
                        self.stages[index].agent.role()
                    );
                    self.context.push(index, output);
                }
                Err(e) => {
                    self.state = RunState::Failed;
                    error!(run_id = %self.run_id, "Stage {} failed: {}", index + 1, e);
                    return Err(e);
                }
            }
        }

        self.state = RunState::Completed;
        let elapsed = Utc::now() - started;
        info!(
            run_id = %self.run_id,
            "Pipeline completed in {} ms",
            elapsed.num_milliseconds()
        );
        self.context
            .last()
            .map(|entry| entry.output.clone())
            .ok_or_else(|| AgentError::Unexpected("pipeline has no stages".to_string()))
    }
}
