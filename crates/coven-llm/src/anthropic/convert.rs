use super::types::{MessagesResponse, ResponseBlock, WireMessage};
use crate::completion::TokenUsage;
use crate::message::{Message, MessageRole};

/// Split system text out of the conversation; the API takes it as a separate field
pub(crate) fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<WireMessage>) {
    let mut system_parts = Vec::new();
    let mut wire = Vec::with_capacity(messages.len());

    for msg in messages {
        match msg.role {
            MessageRole::System => {
                if !msg.content.is_empty() {
                    system_parts.push(msg.content.as_str());
                }
            }
            MessageRole::User | MessageRole::Assistant => wire.push(WireMessage {
                role: msg.role.as_str(),
                content: msg.content.clone(),
            }),
        }
    }

    let system = (!system_parts.is_empty()).then(|| system_parts.join("\n\n"));
    (system, wire)
}

/// Concatenate all text blocks of a response
pub(crate) fn response_text(response: &MessagesResponse) -> String {
    response
        .content
        .iter()
        .filter_map(|block| match block {
            ResponseBlock::Text { text } => Some(text.as_str()),
            ResponseBlock::Other => None,
        })
        .collect()
}

pub(crate) fn usage(response: &MessagesResponse) -> TokenUsage {
    TokenUsage {
        prompt_tokens: response.usage.input_tokens,
        completion_tokens: response.usage.output_tokens,
        total_tokens: response.usage.input_tokens + response.usage.output_tokens,
    }
}
