use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::AppConfig,
    log_error, log_info,
    models::{AnalysisResult, Submission, VocabularyResult},
};

use super::{
    decode::{decode_analysis, decode_vocabulary},
    error::ServiceError,
    prompts::{analysis_prompt, vocabulary_prompt},
    schema::{analysis_schema, vocabulary_schema},
    AnalysisService, VocabularyService,
};

const ENABLE_LOGS: bool = true;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Client for a Gemini-style `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn generate(&self, parts: Vec<Part>, schema: Value) -> Result<String, ServiceError> {
        let api_key = self.api_key.as_deref().ok_or(ServiceError::MissingApiKey)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log_error!("AI service returned {}: {}", status, body);
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response.json().await?;
        let text: String = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ServiceError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl AnalysisService for GeminiClient {
    async fn analyze(&self, submission: &Submission) -> Result<AnalysisResult, ServiceError> {
        let prompt = analysis_prompt(
            submission.subject,
            &submission.question_text,
            submission.question_image.is_some(),
        );

        let mut parts = vec![Part {
            text: Some(prompt),
            ..Part::default()
        }];
        if let Some(image) = &submission.question_image {
            parts.push(Part {
                inline_data: Some(InlineData {
                    mime_type: image.mime_type().to_string(),
                    data: image.base64_payload().to_string(),
                }),
                ..Part::default()
            });
        }

        log_info!(
            "Requesting analysis ({}, text {} chars, image: {})",
            submission.subject,
            submission.question_text.chars().count(),
            submission.question_image.is_some()
        );
        let text = self.generate(parts, analysis_schema()).await?;
        Ok(decode_analysis(&text)?)
    }
}

#[async_trait]
impl VocabularyService for GeminiClient {
    async fn generate_vocabulary(&self, topic: &str) -> Result<VocabularyResult, ServiceError> {
        let parts = vec![Part {
            text: Some(vocabulary_prompt(topic)),
            ..Part::default()
        }];

        log_info!("Requesting vocabulary for topic '{}'", topic.trim());
        let text = self.generate(parts, vocabulary_schema()).await?;
        Ok(decode_vocabulary(&text)?)
    }
}
