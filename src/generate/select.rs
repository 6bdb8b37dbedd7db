//! Template/style selection for component generation.
//!
//! A classification call picks one candidate by name from a short list.
//! Selection never fails outright: an unmatched or errored answer falls
//! back deterministically to the first candidate in enumeration order.

use super::backend::{CallParams, GenerativeBackend};
use crate::log;
use std::fmt::Write as _;
use std::time::Duration;

/// One selectable component template: a name, a one-line description and
/// the placeholder-bearing source it expands to.
#[derive(Debug, Clone)]
pub struct TemplateCandidate {
    pub name: String,
    pub description: String,
    pub source: String,
}

/// Build the classification prompt.
fn selection_prompt(intent: &str, candidates: &[TemplateCandidate]) -> String {
    let mut prompt = String::new();

    writeln!(prompt, "Pick the component template that best fits this request:").ok();
    writeln!(prompt, "\"{intent}\"").ok();
    writeln!(prompt).ok();
    writeln!(prompt, "Candidates:").ok();
    for candidate in candidates {
        writeln!(prompt, "- {}: {}", candidate.name, candidate.description).ok();
    }
    writeln!(prompt).ok();
    writeln!(prompt, "Answer with the candidate name only, nothing else.").ok();

    prompt
}

/// Select one candidate.
///
/// The response is trimmed of whitespace, quotes and backticks, then
/// matched verbatim against candidate names. Anything else (including a
/// backend error or timeout) resolves to the first candidate.
///
/// # Panics
///
/// Panics if `candidates` is empty; callers check first.
pub(super) async fn select<'a, B: GenerativeBackend>(
    backend: &B,
    params: &CallParams,
    budget: Duration,
    intent: &str,
    candidates: &'a [TemplateCandidate],
) -> &'a TemplateCandidate {
    assert!(!candidates.is_empty(), "selection requires at least one candidate");

    let prompt = selection_prompt(intent, candidates);
    let response = tokio::time::timeout(budget, backend.complete(&prompt, params)).await;

    let choice = match response {
        Ok(Ok(text)) => text,
        Ok(Err(err)) => {
            log!("generate"; "selection call failed ({err}), using first candidate");
            return &candidates[0];
        }
        Err(_) => {
            log!("generate"; "selection call timed out, using first candidate");
            return &candidates[0];
        }
    };

    let choice = choice
        .trim()
        .trim_matches(|c| c == '`' || c == '"' || c == '\'')
        .trim();
    match candidates.iter().find(|c| c.name == choice) {
        Some(candidate) => candidate,
        None => {
            log!("generate"; "selection answer `{choice}` matches no candidate, using `{}`", candidates[0].name);
            &candidates[0]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use anyhow::anyhow;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::future::Future;

    struct Scripted {
        replies: Mutex<VecDeque<anyhow::Result<String>>>,
    }

    impl Scripted {
        fn new(replies: Vec<anyhow::Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
            }
        }
    }

    impl GenerativeBackend for Scripted {
        fn complete(
            &self,
            _prompt: &str,
            _params: &CallParams,
        ) -> impl Future<Output = anyhow::Result<String>> + Send {
            let next = self
                .replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("script exhausted")));
            std::future::ready(next)
        }
    }

    fn candidates() -> Vec<TemplateCandidate> {
        vec![
            TemplateCandidate {
                name: "glass".into(),
                description: "translucent panels".into(),
                source: "{{HEADLINE}}".into(),
            },
            TemplateCandidate {
                name: "brutalist".into(),
                description: "raw blocks".into(),
                source: "{{TITLE}}".into(),
            },
        ]
    }

    fn params() -> CallParams {
        CallParams::from_config(&GenerationConfig::default())
    }

    const BUDGET: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_verbatim_match() {
        let backend = Scripted::new(vec![Ok("brutalist".into())]);
        let candidates = candidates();
        let chosen = select(&backend, &params(), BUDGET, "raw look", &candidates).await;
        assert_eq!(chosen.name, "brutalist");
    }

    #[tokio::test]
    async fn test_match_tolerates_wrapping_quotes() {
        let backend = Scripted::new(vec![Ok("  \"brutalist\"\n".into())]);
        let candidates = candidates();
        let chosen = select(&backend, &params(), BUDGET, "raw look", &candidates).await;
        assert_eq!(chosen.name, "brutalist");
    }

    #[tokio::test]
    async fn test_unmatched_answer_falls_back_to_first() {
        let backend = Scripted::new(vec![Ok("neon".into())]);
        let candidates = candidates();
        let chosen = select(&backend, &params(), BUDGET, "glowy", &candidates).await;
        assert_eq!(chosen.name, "glass");
    }

    #[tokio::test]
    async fn test_backend_error_falls_back_to_first() {
        let backend = Scripted::new(vec![Err(anyhow!("boom"))]);
        let candidates = candidates();
        let chosen = select(&backend, &params(), BUDGET, "anything", &candidates).await;
        assert_eq!(chosen.name, "glass");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back_to_first() {
        struct Stalled;
        impl GenerativeBackend for Stalled {
            fn complete(
                &self,
                _prompt: &str,
                _params: &CallParams,
            ) -> impl Future<Output = anyhow::Result<String>> + Send {
                std::future::pending()
            }
        }

        let candidates = candidates();
        let chosen = select(&Stalled, &params(), BUDGET, "anything", &candidates).await;
        assert_eq!(chosen.name, "glass");
    }

    #[test]
    fn test_prompt_enumerates_candidates() {
        let prompt = selection_prompt("glowy hero", &candidates());
        assert!(prompt.contains("glass: translucent panels"));
        assert!(prompt.contains("brutalist: raw blocks"));
        assert!(prompt.contains("glowy hero"));
    }
}
