use serde_json::Value;
use tracing::{debug, info, warn};

use crate::gemini::{ChatMessage, ChatOutcome, GeminiClient};
use crate::tools::ToolRegistry;
use crate::types::{PipelineContext, Task};

pub mod researcher;
pub mod writer;

/// Cap on tool round-trips within one `resolve` call. The wire contract
/// allows zero-or-more calls per generation; the cap keeps a confused
/// backend from looping forever.
const MAX_TOOL_ROUNDS: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] crate::gemini::GeminiError),
    #[error("Unexpected: {0}")]
    Unexpected(String),
}

/// A named role bound to the generation backend, optionally with tool
/// access. Constructed per run and owned by the run that created it.
pub struct Agent {
    role: String,
    goal: String,
    backstory: String,
    client: GeminiClient,
    tools: ToolRegistry,
}

impl Agent {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
        client: GeminiClient,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            client,
            tools: ToolRegistry::new(),
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// Resolve one task against the accumulated context. Drives the
    /// tool-call sub-protocol: while the backend requests tool calls, run
    /// them against the registry, append the tool turns, and re-invoke.
    /// The backend's final text is returned unchanged.
    pub async fn resolve(
        &self,
        task: &Task,
        context: &PipelineContext,
    ) -> Result<String, AgentError> {
        let mut messages = vec![
            ChatMessage::system(self.system_prompt(task)),
            ChatMessage::user(Self::user_prompt(task, context)),
        ];
        let declarations = self.tools.declarations();

        for _round in 0..=MAX_TOOL_ROUNDS {
            let outcome = self.client.chat(messages.clone(), &declarations).await?;
            match outcome {
                ChatOutcome::Text(text) => {
                    debug!("{}: backend produced final text", self.role);
                    return Ok(text);
                }
                ChatOutcome::ToolCalls { message, calls } => {
                    messages.push(message);
                    for call in calls {
                        let output = self.run_tool(&call.function.name, &call.function.arguments).await;
                        messages.push(ChatMessage::tool(call.id, output));
                    }
                }
            }
        }

        Err(AgentError::Unexpected(format!(
            "backend kept requesting tools beyond {} rounds",
            MAX_TOOL_ROUNDS
        )))
    }

    /// Execute one requested tool call. Unknown names and malformed
    /// arguments are answered with a textual error in the tool turn,
    /// consistent with the tool-failures-are-data policy.
    async fn run_tool(&self, name: &str, arguments: &str) -> String {
        let Some(tool) = self.tools.get(name) else {
            warn!("{}: backend requested unknown tool '{}'", self.role, name);
            return format!("Error: unknown tool '{}'.", name);
        };

        let args: Value = match serde_json::from_str(arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!("{}: malformed arguments for '{}': {}", self.role, name, e);
                return format!("Error: could not parse arguments for '{}': {}", name, e);
            }
        };

        info!("{}: invoking tool '{}'", self.role, name);
        let output = tool.invoke(&args).await;
        debug!("{}: tool '{}' returned: {}", self.role, name, output);
        output
    }

    fn system_prompt(&self, task: &Task) -> String {
        format!(
            "You are {role}.\nYour goal: {goal}\n{backstory}\n\nExpected output: {expected}",
            role = self.role,
            goal = self.goal,
            backstory = self.backstory,
            expected = task.expected_output,
        )
    }

    fn user_prompt(task: &Task, context: &PipelineContext) -> String {
        if context.is_empty() {
            task.description.clone()
        } else {
            format!(
                "Context from earlier pipeline steps:\n{}\n\n{}",
                context.as_prompt(),
                task.description
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn agent_config(base_url: String, market_base_url: String) -> Config {
        Config {
            api_key: "test-key".to_string(),
            base_url,
            model: "gemini-flash-latest".to_string(),
            temperature: 0.5,
            max_tokens: 2048,
            timeout: 5,
            market_data_base_url: market_base_url,
        }
    }

    fn tool_call_response(name: &str, arguments: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": name, "arguments": arguments}
                }]
            }}]
        }))
    }

    fn text_response(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": text}}]
        }))
    }

    fn researcher_for_test(config: &Config) -> Agent {
        let client = GeminiClient::new(config.clone()).unwrap();
        researcher::build(config, client).unwrap()
    }

    #[tokio::test]
    async fn resolve_feeds_tool_output_back_into_the_same_generation() {
        let backend = MockServer::start().await;
        let market = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/quote/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"currentPrice": 150.25})))
            .expect(1)
            .mount(&market)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(tool_call_response(
                "get_stock_price",
                "{\"ticker\":\"AAPL\"}",
            ))
            .up_to_n_times(1)
            .mount(&backend)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(text_response("AAPL trades at ₹150.25 right now."))
            .expect(1)
            .mount(&backend)
            .await;

        let config = agent_config(backend.uri(), market.uri());
        let agent = researcher_for_test(&config);
        let task = researcher::research_task("AAPL");

        let output = agent.resolve(&task, &PipelineContext::new()).await.unwrap();
        assert_eq!(output, "AAPL trades at ₹150.25 right now.");

        // The follow-up request must carry the tool's report as a tool turn.
        let requests = backend.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        let follow_up = String::from_utf8(requests[1].body.clone()).unwrap();
        assert!(follow_up.contains("The live price of AAPL is ₹150.25"));
        assert!(follow_up.contains("\"tool_call_id\":\"call_1\""));
    }

    #[tokio::test]
    async fn unknown_tool_requests_are_answered_with_text() {
        let backend = MockServer::start().await;
        let market = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(tool_call_response("read_filings", "{}"))
            .up_to_n_times(1)
            .mount(&backend)
            .await;
        Mock::given(method("POST"))
            .respond_with(text_response("done"))
            .mount(&backend)
            .await;

        let config = agent_config(backend.uri(), market.uri());
        let agent = researcher_for_test(&config);
        let task = researcher::research_task("AAPL");

        let output = agent.resolve(&task, &PipelineContext::new()).await.unwrap();
        assert_eq!(output, "done");

        let requests = backend.received_requests().await.unwrap();
        let follow_up = String::from_utf8(requests[1].body.clone()).unwrap();
        assert!(follow_up.contains("Error: unknown tool 'read_filings'."));
    }

    #[tokio::test]
    async fn endless_tool_requests_hit_the_round_cap() {
        let backend = MockServer::start().await;
        let market = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"currentPrice": 1.0})))
            .mount(&market)
            .await;
        Mock::given(method("POST"))
            .respond_with(tool_call_response(
                "get_stock_price",
                "{\"ticker\":\"AAPL\"}",
            ))
            .mount(&backend)
            .await;

        let config = agent_config(backend.uri(), market.uri());
        let agent = researcher_for_test(&config);
        let task = researcher::research_task("AAPL");

        let err = agent
            .resolve(&task, &PipelineContext::new())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AgentError::Unexpected(_)));
    }

    #[tokio::test]
    async fn plain_agent_sends_no_tool_declarations() {
        let backend = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(text_response("a blog post"))
            .expect(1)
            .mount(&backend)
            .await;

        let config = agent_config(backend.uri(), "http://unused.invalid".to_string());
        let client = GeminiClient::new(config).unwrap();
        let agent = writer::build(client);
        let mut context = PipelineContext::new();
        context.push(0, "The live price of AAPL is ₹150.25".to_string());

        let output = agent
            .resolve(&writer::writing_task("AAPL"), &context)
            .await
            .unwrap();
        assert_eq!(output, "a blog post");

        let requests = backend.received_requests().await.unwrap();
        let body = String::from_utf8(requests[0].body.clone()).unwrap();
        assert!(!body.contains("\"tools\""));
        assert!(body.contains("The live price of AAPL is ₹150.25"));
    }
}
