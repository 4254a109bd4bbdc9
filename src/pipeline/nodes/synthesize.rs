// Synthesize node
// Final answer generation, grounded in research context or direct

use async_trait::async_trait;

use crate::llm::{ChatMessage, CompletionRequest};
use crate::pipeline::node::{GraphError, Node, NodeContext, NodeOutput};
use crate::pipeline::state::RequestState;

const GROUNDED_PROMPT: &str = r#"# Role
You are a helpful and skilled Research Assistant.

# Task
Your task is to provide a comprehensive answer to the user's query based ONLY on the provided search results.

# Instructions
- **Tone:** Be professional but conversational. Write naturally, as if explaining the topic to a smart friend. Avoid robotic language or repetitive phrases.

- **Format:** Structure your answer as a clean, readable article. Use Markdown Headers (##) to separate distinct topics and clear paragraphs for explanations. Use bullet points only when listing facts or steps.

- **Accuracy:** Ground your answer strictly in the provided text. Do not make up information.

- **Context:** If the conversation history provides context (like answering "Who is he?"), use it.

- **Irrelevance:** If the provided search results do not contain the answer, state clearly that you couldn't find specific information."#;

const DIRECT_PROMPT: &str = "You are a helpful AI assistant.";

const GROUNDED_TEMPERATURE: f64 = 0.3;
const DIRECT_TEMPERATURE: f64 = 1.0;

pub struct SynthesizeNode;

impl SynthesizeNode {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SynthesizeNode {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for SynthesizeNode {
    fn id(&self) -> &'static str {
        "synthesize"
    }

    fn name(&self) -> &'static str {
        "Answer Synthesizer"
    }

    async fn execute(
        &self,
        state: &mut RequestState,
        ctx: &NodeContext<'_>,
    ) -> Result<NodeOutput, GraphError> {
        let mode = if state.context.is_some() { "grounded" } else { "direct" };
        tracing::info!("Generating final answer ({} mode)", mode);

        let request = build_request(&state.query, state.context.as_deref(), &state.history);

        // The reply field always carries a readable sentence, even when the
        // backend fails.
        let reply = match ctx.app.completion.complete(request).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("Answer generation failed: {}", err);
                format!("I ran into a problem while generating an answer: {}", err)
            }
        };

        state.reply = Some(reply);
        Ok(NodeOutput::Final)
    }
}

/// Build the completion request: system persona, then prior history, then
/// the current turn. With context the persona is the grounded researcher;
/// without it, a plain assistant answering the query verbatim.
fn build_request(query: &str, context: Option<&str>, history: &[ChatMessage]) -> CompletionRequest {
    let (persona, user_content, temperature) = match context {
        Some(context) => (
            GROUNDED_PROMPT,
            format!("USER QUESTION: {}\n\nRESEARCH DATA:\n{}", query, context),
            GROUNDED_TEMPERATURE,
        ),
        None => (DIRECT_PROMPT, query.to_string(), DIRECT_TEMPERATURE),
    };

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(persona));
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(user_content));

    CompletionRequest::new(messages, temperature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn direct_mode_sends_query_verbatim() {
        let request = build_request("Hello", None, &[]);

        assert_eq!(request.temperature, 1.0);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, "You are a helpful AI assistant.");
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(request.messages[1].content, "Hello");
    }

    #[test]
    fn grounded_mode_wraps_query_and_context() {
        let request = build_request("Latest AI news", Some("--- Source 1 ---\nfacts"), &[]);

        assert_eq!(request.temperature, 0.3);
        assert!(request.messages[0].content.contains("Research Assistant"));
        let user = &request.messages[1].content;
        assert!(user.starts_with("USER QUESTION: Latest AI news"));
        assert!(user.contains("RESEARCH DATA:\n--- Source 1 ---\nfacts"));
    }

    #[test]
    fn history_sits_between_persona_and_current_turn() {
        let history = vec![
            ChatMessage::user("Who wrote Dune?"),
            ChatMessage::assistant("Frank Herbert."),
        ];
        let request = build_request("When?", None, &history);

        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].content, "Who wrote Dune?");
        assert_eq!(request.messages[2].content, "Frank Herbert.");
        assert_eq!(request.messages[3].content, "When?");
    }
}
