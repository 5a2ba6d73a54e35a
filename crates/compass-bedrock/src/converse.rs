use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, InferenceConfiguration, Message, SystemContentBlock,
};
use tracing::info;

use crate::error::BedrockError;

/// One single-turn Converse call. Returns the concatenated text blocks of
/// the reply.
pub async fn converse_once(
    client: &Client,
    model_id: &str,
    system_prompt: &str,
    content: Vec<ContentBlock>,
    max_tokens: i32,
) -> Result<String, BedrockError> {
    let message = Message::builder()
        .role(ConversationRole::User)
        .set_content(Some(content))
        .build()
        .map_err(|e| BedrockError::Build(e.to_string()))?;

    let inference = InferenceConfiguration::builder()
        .max_tokens(max_tokens)
        .temperature(0.0)
        .build();

    let response = client
        .converse()
        .model_id(model_id)
        .system(SystemContentBlock::Text(system_prompt.to_string()))
        .messages(message)
        .inference_config(inference)
        .send()
        .await
        .map_err(|e| BedrockError::Invocation(e.into_service_error().to_string()))?;

    let output_message = response
        .output()
        .and_then(|o| o.as_message().ok())
        .ok_or_else(|| BedrockError::ResponseParse("no message in response".to_string()))?;

    let text = collect_text(output_message.content());

    if let Some(usage) = response.usage() {
        info!(
            model_id,
            input_tokens = usage.input_tokens(),
            output_tokens = usage.output_tokens(),
            "converse complete"
        );
    }

    Ok(text)
}

fn collect_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| {
            if let ContentBlock::Text(t) = block {
                Some(t.as_str())
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("")
}
