/*!
 * HTTP client for the translation function.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

use super::{TranslateRequest, TranslateResponse, Translator};
use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;

/// JSON body expected by the translation function
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslationPayload<'a> {
    text: &'a str,
    source_lang: &'static str,
    target_lang: &'static str,
}

impl<'a> From<&'a TranslateRequest> for TranslationPayload<'a> {
    fn from(request: &'a TranslateRequest) -> Self {
        Self {
            text: &request.text,
            source_lang: request.source.code(),
            target_lang: request.target.code(),
        }
    }
}

/// Translator that POSTs to a hosted translation function
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn from_config(config: &TranslationConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            Some(config.api_key.clone()),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Map a non-success status to the provider error taxonomy
fn status_error(status: StatusCode, body: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(body),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(body),
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message: body,
        },
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, request: TranslateRequest) -> Result<TranslateResponse, ProviderError> {
        debug!(
            "Translating {} chars {} -> {}",
            request.text.chars().count(),
            request.source,
            request.target
        );

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&TranslationPayload::from(&request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key).header("apikey", key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                ProviderError::ConnectionError(e.to_string())
            } else {
                ProviderError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Translation endpoint error ({}): {}", status, error_text);
            return Err(status_error(status, error_text));
        }

        response
            .json::<TranslateResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    fn name(&self) -> &str {
        "http"
    }
}
