use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use super::QuizGenerator;
use crate::error::GenerationError;
use crate::models::QuizContent;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    url: &'a str,
}

/// Configuration for the HTTP quiz generation service
#[derive(Debug, Clone)]
pub struct HttpGeneratorConfig {
    /// Base URL; requests go to `{endpoint}/generate-quiz`
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for HttpGeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpGenerator {
    config: HttpGeneratorConfig,
    client: Client,
}

impl HttpGenerator {
    pub fn new(config: HttpGeneratorConfig) -> Self {
        info!(endpoint = %config.endpoint, "Creating quiz generation client");
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                Client::new()
            });
        Self { config, client }
    }

    fn generate_url(&self) -> String {
        format!("{}/generate-quiz", self.config.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl QuizGenerator for HttpGenerator {
    #[instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    async fn generate(&self, url: &str) -> Result<QuizContent, GenerationError> {
        debug!("Sending request to quiz generation service");
        let response = self
            .client
            .post(self.generate_url())
            .json(&GenerateRequest { url })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                GenerationError::Http(e.to_string())
            })?;

        let status = response.status();
        debug!(status = %status, "Received response from quiz generation service");

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Quiz generation service rate limit exceeded");
            return Err(GenerationError::RateLimit);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %message, "Quiz generation service error");
            return Err(GenerationError::Api { status: status.as_u16(), message });
        }

        let content: QuizContent = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse quiz generation response JSON");
            GenerationError::InvalidResponse(e.to_string())
        })?;

        info!(questions = content.quiz.len(), title = %content.title, "Received generated quiz");
        Ok(content)
    }
}
