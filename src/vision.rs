use crate::config::VisionConfig;
use crate::error::AppError;
use crate::metadata::{ExifMetadata, VisionAIResult};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

pub const PROMPT: &str = r#"You are helping to publish a photo on a personal photography website.
Look at the photo and answer with the following:
1. "description": a concise, vivid description suitable as alt text for screen readers. Describe the subject, setting, colors and mood. Never use the words "image", "photo", "photograph" or "picture".
2. "title_ideas": exactly 5 short, evocative title ideas.
3. "tags": exactly 5 single-word, lowercase tags. The first tag must name the primary subject.
Return only a raw JSON object of the form {"title_ideas": [...], "description": "...", "tags": [...]}.
Do not wrap the JSON in markdown code fences and do not add any other text."#;

#[async_trait]
pub trait VisionDescriber: Send + Sync {
    async fn describe(&self, exif: &ExifMetadata) -> Result<VisionAIResult, AppError>;
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completions endpoint that accepts inline images.
pub struct ChatVisionClient {
    client: reqwest::Client,
    url: Url,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ChatVisionClient {
    pub fn new(config: &VisionConfig) -> Result<Self, AppError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            AppError::Generic(format!(
                "environment variable {} must hold the vision API key",
                config.api_key_env
            ))
        })?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &VisionConfig, api_key: String) -> Result<Self, AppError> {
        let url = Url::parse(&format!(
            "{}/chat/completions",
            config.endpoint.trim_end_matches('/')
        ))?;
        log::debug!("Creating vision client for {} using model {}", url, config.model);

        let client = reqwest::Client::builder()
            .user_agent(concat!("grid_vision/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url,
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl VisionDescriber for ChatVisionClient {
    async fn describe(&self, exif: &ExifMetadata) -> Result<VisionAIResult, AppError> {
        let bytes = tokio::fs::read(&exif.source_file).await?;
        let encoded = general_purpose::STANDARD.encode(&bytes);
        log::debug!(
            "Requesting description for {} ({} bytes)",
            exif.file_name,
            bytes.len()
        );

        let response = self
            .client
            .post(self.url.clone())
            .bearer_auth(&self.api_key)
            .json(&build_request_body(&self.model, self.max_tokens, &encoded))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Vision(format!("HTTP status {}: {}", status, body)));
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Vision("response has no message content".to_string()))?;
        log::trace!("Vision response for {}: {}", exif.file_name, content);

        parse_vision_response(&content)
    }
}

pub fn build_request_body(model: &str, max_tokens: u32, image_base64: &str) -> Value {
    json!({
        "model": model,
        "max_tokens": max_tokens,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": PROMPT },
                {
                    "type": "image_url",
                    "image_url": { "url": format!("data:image/jpeg;base64,{}", image_base64) }
                }
            ]
        }]
    })
}

/// Parses the first JSON object in a model reply.
///
/// Leading prose or a markdown fence before the object is skipped, and anything after
/// the object is ignored. Missing fields come back empty. When the object is not valid
/// JSON it is read again as JSON5, which accepts trailing commas, single quotes and
/// unquoted keys.
pub fn parse_vision_response(text: &str) -> Result<VisionAIResult, AppError> {
    let start = text
        .find('{')
        .ok_or_else(|| AppError::Vision("response contains no JSON object".to_string()))?;

    let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<VisionAIResult>();
    let strict_error = match values.next() {
        Some(Ok(result)) => return Ok(result),
        Some(Err(e)) => e,
        None => return Err(AppError::Vision("response contains no JSON object".to_string())),
    };

    // JSON5 has no streaming reader, so cut at the last closing brace instead.
    let end = match text.rfind('}') {
        Some(end) if end > start => end,
        _ => return Err(strict_error.into()),
    };
    match json5::from_str::<VisionAIResult>(&text[start..=end]) {
        Ok(result) => {
            log::debug!("Vision response needed the JSON5 fallback: {}", strict_error);
            Ok(result)
        }
        Err(e) => {
            log::trace!("JSON5 fallback failed as well: {}", e);
            Err(strict_error.into())
        }
    }
}
