use serde::{Deserialize, Serialize};

/// One unit of pipeline work. The description is fully rendered (ticker
/// already interpolated) before construction; a task never changes after
/// that. `expected_output` is prompt guidance for the agent, not a schema
/// the result is checked against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub description: String,
    pub expected_output: String,
}

impl Task {
    pub fn new(description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutput {
    pub index: usize,
    pub output: String,
}

/// Append-only record of completed task outputs, threaded forward through
/// the run. Each agent reads the whole context and appends only its own
/// result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineContext {
    outputs: Vec<TaskOutput>,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, index: usize, output: String) {
        self.outputs.push(TaskOutput { index, output });
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn last(&self) -> Option<&TaskOutput> {
        self.outputs.last()
    }

    /// Render the accumulated outputs for inclusion in the next agent's
    /// prompt, in completion order.
    pub fn as_prompt(&self) -> String {
        self.outputs
            .iter()
            .map(|entry| format!("Output of step {}:\n{}", entry.index + 1, entry.output))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
