//! Generative backend collaborator interface.
//!
//! The platform supplies the real model client; the runtime only needs
//! one completion call with model/creativity/token-budget parameters.
//! Two built-in implementations exist for operation without a backend:
//! [`OfflineBackend`] always fails (routing the pipeline to its
//! deterministic fallbacks) and [`ReplayBackend`] returns a captured
//! response body.

use crate::config::GenerationConfig;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Creativity directive for synthesized copy.
///
/// Affects tone and length only, never token coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Creativity {
    Conservative,
    #[default]
    Balanced,
    Experimental,
}

impl Creativity {
    /// Tone/length instruction embedded in prompts.
    pub fn directive(self) -> &'static str {
        match self {
            Self::Conservative => {
                "Keep the copy plain, short and factual. Avoid wordplay and superlatives."
            }
            Self::Balanced => {
                "Keep the copy friendly and concise, with light personality."
            }
            Self::Experimental => {
                "Be bold and memorable. Wordplay and unexpected phrasing are welcome, \
                 but stay short."
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Balanced => "balanced",
            Self::Experimental => "experimental",
        }
    }
}

/// Per-call parameters passed to the backend.
#[derive(Debug, Clone)]
pub struct CallParams {
    pub model: String,
    pub creativity: Creativity,
    pub max_tokens: u32,
}

impl CallParams {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            model: config.model.clone(),
            creativity: config.creativity,
            max_tokens: config.max_tokens,
        }
    }
}

/// One-call interface to a generative model.
pub trait GenerativeBackend: Send + Sync {
    /// Run one completion call and return the raw response text.
    fn complete(
        &self,
        prompt: &str,
        params: &CallParams,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Backend for environments without a configured model.
///
/// Every call fails, so the content stage falls back to deterministic
/// filler and the whole-theme stage surfaces a typed failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineBackend;

impl GenerativeBackend for OfflineBackend {
    fn complete(
        &self,
        _prompt: &str,
        _params: &CallParams,
    ) -> impl Future<Output = Result<String>> + Send {
        std::future::ready(Err(anyhow!("no generative backend configured")))
    }
}

/// Backend replaying one captured response body for every call.
///
/// Lets an operator pipe a response recorded elsewhere through the same
/// parsing/merge/apply path the live pipeline uses.
#[derive(Debug, Clone)]
pub struct ReplayBackend {
    body: String,
}

impl ReplayBackend {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl GenerativeBackend for ReplayBackend {
    fn complete(
        &self,
        _prompt: &str,
        _params: &CallParams,
    ) -> impl Future<Output = Result<String>> + Send {
        std::future::ready(Ok(self.body.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_backend_always_fails() {
        let params = CallParams::from_config(&GenerationConfig::default());
        let result = OfflineBackend.complete("anything", &params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_replay_backend_returns_body() {
        let params = CallParams::from_config(&GenerationConfig::default());
        let backend = ReplayBackend::new("{\"a\": 1}");
        assert_eq!(backend.complete("x", &params).await.unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_creativity_serde_names() {
        assert_eq!(
            serde_json::from_str::<Creativity>("\"experimental\"").unwrap(),
            Creativity::Experimental
        );
        assert_eq!(Creativity::default(), Creativity::Balanced);
        assert_eq!(Creativity::Conservative.as_str(), "conservative");
    }
}
