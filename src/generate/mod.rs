//! LLM-assisted generation pipeline.
//!
//! ```text
//!                 ┌────────────┐    ┌────────────┐    ┌───────────┐
//!  request ──────►│  selection │───►│  content   │───►│   merge   │──► component
//!  (component)    │ (pick one) │    │ (synth map)│    │ (tokens)  │
//!                 └────────────┘    └────────────┘    └───────────┘
//!
//!  request ──────► theme prompt ──► recover file map ──► [apply]
//!  (theme)                                               backup first
//! ```
//!
//! Selection and content synthesis degrade deterministically: a failed or
//! timed-out call falls back to the first candidate and to the filler
//! table. Whole-theme generation has no safe fallback and surfaces typed
//! errors instead. Applying a theme result is a separate, explicit step
//! guarded by a backup snapshot.

mod backend;
mod content;
mod parse;
mod select;

pub mod apply;

pub use apply::{ApplyReport, apply_theme_files};
pub use backend::{CallParams, Creativity, GenerativeBackend, OfflineBackend, ReplayBackend};
pub use select::TemplateCandidate;

use crate::compose::model::Site;
use crate::config::GenerationConfig;
use crate::error::GenerateError;
use crate::log;
use crate::placeholder;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;
use tokio::time::timeout;

// ============================================================================
// Requests
// ============================================================================

/// Brand context a generation request is scoped by.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub name: String,
    pub industry: String,
    pub style_preference: Option<String>,
    pub brand_personality: Option<String>,
}

impl SiteContext {
    pub fn from_site(site: &Site) -> Self {
        Self {
            name: site.name.clone(),
            industry: site.industry.clone(),
            style_preference: site.style_preference.clone(),
            brand_personality: site.brand_personality.clone(),
        }
    }
}

/// What a generation request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// One component: template selection + content synthesis + merge.
    Component,
    /// A whole theme: complete file bodies, applied separately.
    Theme,
}

/// One generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub kind: TargetKind,
    /// Operator's free-form description of what to produce.
    pub intent: String,
    pub site: SiteContext,
    /// Overrides the configured creativity when set.
    pub creativity: Option<Creativity>,
}

/// A finished component generation.
#[derive(Debug, Clone)]
pub struct ComponentResult {
    /// Name of the template the source was expanded from.
    pub template: String,
    /// Token -> copy map used in the merge.
    pub content: BTreeMap<String, String>,
    /// Fully substituted component source.
    pub source: String,
}

// ============================================================================
// Generator
// ============================================================================

/// Pipeline front door, generic over the backend collaborator.
pub struct Generator<B: GenerativeBackend> {
    backend: B,
    config: GenerationConfig,
}

impl<B: GenerativeBackend> Generator<B> {
    pub fn new(backend: B, config: GenerationConfig) -> Self {
        Self { backend, config }
    }

    fn params(&self, request: &GenerationRequest) -> CallParams {
        let mut params = CallParams::from_config(&self.config);
        if let Some(creativity) = request.creativity {
            params.creativity = creativity;
        }
        params
    }

    fn budget(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Generate one component from a set of template candidates.
    ///
    /// Selection and synthesis both degrade rather than fail; the only
    /// failure modes are an empty candidate list and a merge that leaves
    /// tokens unfilled.
    pub async fn generate_component(
        &self,
        request: &GenerationRequest,
        candidates: &[TemplateCandidate],
    ) -> Result<ComponentResult, GenerateError> {
        if candidates.is_empty() {
            return Err(GenerateError::NoCandidates);
        }

        let params = self.params(request);
        let budget = self.budget();

        let template = select::select(
            &self.backend,
            &params,
            budget,
            &request.intent,
            candidates,
        )
        .await;
        log!("generate"; "selected template `{}`", template.name);

        let tokens = placeholder::extract_tokens(&template.source);
        let content = self
            .synthesize_content(&tokens, &request.site, &params, budget)
            .await;

        let source = placeholder::merge(&template.source, &content)?;

        Ok(ComponentResult {
            template: template.name.clone(),
            content,
            source,
        })
    }

    /// Synthesize copy for a token set. Never fails: anything the call
    /// does not cover is filled from the deterministic fallback.
    async fn synthesize_content(
        &self,
        tokens: &[String],
        site: &SiteContext,
        params: &CallParams,
        budget: Duration,
    ) -> BTreeMap<String, String> {
        if tokens.is_empty() {
            return BTreeMap::new();
        }

        let prompt = content::content_prompt(tokens, site, params.creativity);
        let partial = match timeout(budget, self.backend.complete(&prompt, params)).await {
            Ok(Ok(raw)) => match content::parse_content_map(&raw) {
                Some(map) => map,
                None => {
                    log!("generate"; "content response was unparseable, using fallback copy");
                    BTreeMap::new()
                }
            },
            Ok(Err(err)) => {
                log!("generate"; "content call failed ({err}), using fallback copy");
                BTreeMap::new()
            }
            Err(_) => {
                log!("generate"; "content call timed out, using fallback copy");
                BTreeMap::new()
            }
        };

        content::complete_content(tokens, partial, site)
    }

    /// Generate complete file bodies for a whole theme.
    ///
    /// No fallback exists at this scope: a failed call, a timeout or an
    /// unrecoverable response each surface as a typed error and nothing
    /// is written anywhere.
    pub async fn generate_theme(
        &self,
        request: &GenerationRequest,
    ) -> Result<BTreeMap<String, String>, GenerateError> {
        let params = self.params(request);
        let prompt = theme_prompt(&request.intent, &request.site, params.creativity);

        let raw = match timeout(self.budget(), self.backend.complete(&prompt, &params)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => return Err(GenerateError::ThemeBackend(err.to_string())),
            Err(_) => return Err(GenerateError::ThemeTimeout(self.config.timeout_secs)),
        };

        let value: Value = parse::recover(&raw, "json").ok_or(GenerateError::ThemeParse)?;
        let object = value.as_object().ok_or(GenerateError::ThemeParse)?;

        let mut files = BTreeMap::new();
        for (path, body) in object {
            let Value::String(body) = body else {
                return Err(GenerateError::ThemeParse);
            };
            files.insert(path.clone(), body.clone());
        }
        if files.is_empty() {
            return Err(GenerateError::ThemeParse);
        }

        log!("generate"; "theme result holds {} files", files.len());
        Ok(files)
    }
}

/// Build the whole-theme prompt.
fn theme_prompt(intent: &str, site: &SiteContext, creativity: Creativity) -> String {
    let mut prompt = String::new();

    writeln!(
        prompt,
        "Design a complete website theme for the site \"{}\".",
        site.name
    )
    .ok();
    if !site.industry.is_empty() {
        writeln!(prompt, "Industry: {}.", site.industry).ok();
    }
    if let Some(style) = &site.style_preference {
        writeln!(prompt, "Style preference: {style}.").ok();
    }
    if let Some(personality) = &site.brand_personality {
        writeln!(prompt, "Brand personality: {personality}.").ok();
    }
    writeln!(prompt, "Request: {intent}").ok();
    writeln!(prompt, "{}", creativity.directive()).ok();
    writeln!(prompt).ok();
    writeln!(
        prompt,
        "Respond with a JSON object mapping relative file paths to complete \
         file contents. Every value must be the full text of that file."
    )
    .ok();

    prompt
}
