//! Non-streaming chat completion against Ollama or an OpenAI-compatible API.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::llm::post_json;

/// Send a system + user prompt pair and return the assistant's raw reply.
/// Replies are requested in JSON mode where the provider supports it.
pub async fn complete(
    client: &reqwest::Client,
    config: &LlmConfig,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<String> {
    let messages = [
        Message {
            role: "system",
            content: system_prompt,
        },
        Message {
            role: "user",
            content: user_prompt,
        },
    ];

    match config.provider.as_str() {
        "ollama" => {
            let url = format!("{}/api/chat", config.base_url);
            let req = OllamaChatRequest {
                model: &config.chat_model,
                messages: &messages,
                stream: false,
                format: "json",
            };
            let body: OllamaChatResponse =
                post_json(client.post(&url).json(&req), "Ollama chat API").await?;
            Ok(body.message.content)
        }
        "openai" => {
            let url = format!("{}/v1/chat/completions", config.base_url);
            let api_key = config.api_key.as_deref().unwrap_or_default();
            let req = OpenAiChatRequest {
                model: &config.chat_model,
                messages: &messages,
                temperature: 0.0,
            };
            let request = client
                .post(&url)
                .header("Authorization", format!("Bearer {api_key}"))
                .json(&req);
            let body: OpenAiChatResponse = post_json(request, "OpenAI chat API").await?;
            body.choices
                .into_iter()
                .next()
                .map(|c| c.message.content)
                .context("OpenAI chat API returned no choices")
        }
        other => anyhow::bail!("Unknown LLM provider: {other}"),
    }
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message<'a>],
    stream: bool,
    format: &'a str,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: ReplyMessage,
}

#[derive(Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message<'a>],
    temperature: f32,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: ReplyMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_reply_shape() {
        let raw = r#"{"choices": [{"message": {"role": "assistant", "content": "{\"bedrooms\": 2}"}}]}"#;
        let body: OpenAiChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(body.choices[0].message.content, r#"{"bedrooms": 2}"#);
    }

    #[test]
    fn test_ollama_request_serializes_json_mode() {
        let messages = [Message {
            role: "user",
            content: "hi",
        }];
        let req = OllamaChatRequest {
            model: "llama3.2",
            messages: &messages,
            stream: false,
            format: "json",
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["format"], "json");
        assert_eq!(value["stream"], false);
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_unknown_provider_is_an_error() {
        let config = LlmConfig {
            provider: "carrier-pigeon".to_string(),
            ..LlmConfig::default()
        };
        let err = complete(&reqwest::Client::new(), &config, "sys", "user")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown LLM provider"));
    }
}
