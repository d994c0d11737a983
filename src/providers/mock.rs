/*!
 * Mock translator for testing.
 *
 * - `MockTranslator::working()` tags every non-empty line with the target code
 * - `MockTranslator::failing()` always errors
 * - `MockTranslator::fail_on_call(n)` errors on the n-th call only
 * - `MockTranslator::malformed()` answers without `translatedText`
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{TranslateRequest, TranslateResponse, Translator};
use crate::errors::ProviderError;

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Always fails with an API error
    Failing,
    /// Fails on the given call (1-based), succeeds otherwise
    FailOnCall { call: usize },
    /// Answers without `translatedText`
    Malformed,
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
}

/// Scripted translator. Clones share the call counter and request log.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    behavior: MockBehavior,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<TranslateRequest>>>,
    custom_response: Option<fn(&TranslateRequest) -> String>,
}

impl MockTranslator {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn fail_on_call(call: usize) -> Self {
        Self::new(MockBehavior::FailOnCall { call })
    }

    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Replace the default translation text
    pub fn with_custom_response(mut self, generator: fn(&TranslateRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of calls made so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Every request received, in call order
    pub fn requests(&self) -> Vec<TranslateRequest> {
        self.requests.lock().clone()
    }

    fn translation_for(&self, request: &TranslateRequest) -> String {
        if let Some(generator) = self.custom_response {
            return generator(request);
        }
        request
            .text
            .lines()
            .map(|line| {
                if line.trim().is_empty() {
                    String::new()
                } else {
                    format!("[{}] {}", request.target.code(), line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, request: TranslateRequest) -> Result<TranslateResponse, ProviderError> {
        let call = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => Ok(TranslateResponse::text(self.translation_for(&request))),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated translator failure".to_string(),
            }),

            MockBehavior::FailOnCall { call: failing } => {
                if call == failing {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated failure on call #{}", call),
                    })
                } else {
                    Ok(TranslateResponse::text(self.translation_for(&request)))
                }
            }

            MockBehavior::Malformed => Ok(TranslateResponse::default()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(TranslateResponse::text(self.translation_for(&request)))
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
