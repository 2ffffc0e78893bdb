use crate::gemini::GeminiClient;
use crate::types::Task;

use super::Agent;

/// Writing stage: a plain agent with an empty tool set, so the backend is
/// never offered a tool it cannot service.
pub fn build(client: GeminiClient) -> Agent {
    Agent::new(
        "Financial Blog Writer",
        "Write a blog with LIVE PRICE",
        "Writes engaging blogs in Hinglish.",
        client,
    )
}

pub fn writing_task(ticker: &str) -> Task {
    Task::new(
        format!(
            "Write a short Hinglish blog about '{}'. INCLUDE THE LIVE PRICE.",
            ticker
        ),
        "A blog post with the price.",
    )
}
