//! Sitewright - theme runtime for a multi-tenant content platform.

mod cli;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use cli::{Cli, Commands, GenerateTarget};
use sitewright::compose::{Composer, InMemoryStore, Site};
use sitewright::generate::{
    CallParams, GenerationRequest, Generator, GenerativeBackend, OfflineBackend, ReplayBackend,
    SiteContext, TargetKind, TemplateCandidate, apply_theme_files,
};
use sitewright::registry::{self, DiscoveryReport};
use sitewright::{RuntimeConfig, log};
use std::fs;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Discover {
            theme,
            write_manifest,
        } => run_discover(&config, theme, *write_manifest),
        Commands::Render {
            theme,
            site,
            page,
            out,
        } => run_render(&config, theme, site, page.as_deref(), out.as_deref()),
        Commands::Generate { .. } => run_generate(&config, &cli),
    }
}

/// Load and validate configuration from CLI arguments.
///
/// A missing config file is fine; the runtime operates on defaults.
fn load_config(cli: &Cli) -> Result<RuntimeConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        RuntimeConfig::from_path(&config_path)?
    } else {
        RuntimeConfig::default()
    };
    config.root = root.to_path_buf();
    config.validate()?;

    Ok(config)
}

// ============================================================================
// discover
// ============================================================================

fn run_discover(config: &RuntimeConfig, theme: &str, write_manifest: bool) -> Result<()> {
    let report = discover_theme(config, theme)?;

    log!(
        "discover";
        "theme `{}` v{}: {} components ({} main, {} sub)",
        report.theme.name,
        report.theme.version,
        report.manifest.len(),
        report.manifest.main_components().len(),
        report.manifest.sub_components().len()
    );
    for meta in report.manifest.iter().map(|entry| &entry.meta) {
        log!(
            "discover";
            "  {} [{}] - {}",
            meta.type_tag,
            meta.category,
            meta.source.display()
        );
    }
    for skipped in &report.skipped {
        log!("discover"; "skipped `{}` (no declaration)", skipped.display());
    }

    if write_manifest {
        let theme_dir = config.theme_dir(theme);
        let path =
            registry::manifest::write_manifest_module(&report.manifest, &theme_dir, &config.theme)?;
        log!("discover"; "wrote manifest module to `{}`", path.display());
    }

    Ok(())
}

/// Run discovery for a theme, surfacing warnings and per-file errors on
/// the way. Per-file errors never abort the scan.
fn discover_theme(config: &RuntimeConfig, theme: &str) -> Result<DiscoveryReport> {
    let theme_dir = config.theme_dir(theme);
    if !theme_dir.is_dir() {
        bail!("theme `{theme}` not found under `{}`", config.themes_root().display());
    }

    let report = registry::discover(&theme_dir, &config.theme);
    for warning in &report.warnings {
        log!("warn"; "{warning}");
    }
    for error in &report.errors {
        log!("error"; "{error}");
    }
    Ok(report)
}

// ============================================================================
// render
// ============================================================================

fn run_render(
    config: &RuntimeConfig,
    theme: &str,
    site_path: &Path,
    page_id: Option<&str>,
    out: Option<&Path>,
) -> Result<()> {
    let report = discover_theme(config, theme)?;

    let content = fs::read_to_string(site_path)
        .with_context(|| format!("failed to read site fixture `{}`", site_path.display()))?;
    let site: Site = toml::from_str(&content)
        .with_context(|| format!("malformed site fixture `{}`", site_path.display()))?;

    let page = match page_id {
        Some(id) => site
            .pages
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| anyhow!("page `{id}` not found in site `{}`", site.id))?,
        None => site
            .pages
            .first()
            .ok_or_else(|| anyhow!("site `{}` has no pages", site.id))?,
    }
    .clone();

    let store = InMemoryStore::new(site);
    let composer = Composer::new(&report.manifest, &config.theme.content_marker);
    let html = composer.compose_page(&page, &store).to_html();

    log!("render"; "composed page `{}` ({} blocks)", page.id, page.blocks.len());
    match out {
        Some(path) => {
            fs::write(path, &html)
                .with_context(|| format!("failed to write `{}`", path.display()))?;
            log!("render"; "wrote `{}`", path.display());
        }
        None => println!("{html}"),
    }

    Ok(())
}

// ============================================================================
// generate
// ============================================================================

/// Backend chosen by CLI flags.
enum CliBackend {
    Offline(OfflineBackend),
    Replay(ReplayBackend),
}

impl GenerativeBackend for CliBackend {
    async fn complete(&self, prompt: &str, params: &CallParams) -> Result<String> {
        match self {
            Self::Offline(backend) => backend.complete(prompt, params).await,
            Self::Replay(backend) => backend.complete(prompt, params).await,
        }
    }
}

fn run_generate(config: &RuntimeConfig, cli: &Cli) -> Result<()> {
    let Commands::Generate {
        target,
        intent,
        theme,
        site_name,
        industry,
        style,
        personality,
        creativity,
        response_file,
        apply,
    } = &cli.command
    else {
        unreachable!("run_generate dispatched for a non-generate command");
    };

    let backend = match response_file {
        Some(path) => {
            let body = fs::read_to_string(path)
                .with_context(|| format!("failed to read response file `{}`", path.display()))?;
            CliBackend::Replay(ReplayBackend::new(body))
        }
        None => CliBackend::Offline(OfflineBackend),
    };
    let generator = Generator::new(backend, config.generation.clone());

    let request = GenerationRequest {
        kind: match target {
            GenerateTarget::Component => TargetKind::Component,
            GenerateTarget::Theme => TargetKind::Theme,
        },
        intent: intent.clone(),
        site: SiteContext {
            name: site_name.clone(),
            industry: industry.clone(),
            style_preference: style.clone(),
            brand_personality: personality.clone(),
        },
        creativity: creativity.map(Into::into),
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    match request.kind {
        TargetKind::Component => {
            let candidates = template_candidates(config, theme)?;
            let result = runtime.block_on(generator.generate_component(&request, &candidates))?;
            log!(
                "generate";
                "component from template `{}` ({} tokens filled)",
                result.template,
                result.content.len()
            );
            println!("{}", result.source);
        }
        TargetKind::Theme => {
            let files = runtime.block_on(generator.generate_theme(&request))?;
            if *apply {
                let report = apply_theme_files(
                    &config.theme_dir(theme),
                    theme,
                    &files,
                    &config.backups_root(),
                    None,
                )?;
                log!(
                    "generate";
                    "applied {} files, snapshot at `{}`",
                    report.written.len(),
                    report.backup.display()
                );
            } else {
                println!("{}", serde_json::to_string_pretty(&files)?);
                log!("generate"; "dry run: {} files, nothing applied", files.len());
            }
        }
    }

    Ok(())
}

/// Build template candidates from a theme's registered components.
///
/// Each main component contributes its source text; placeholder tokens in
/// it define what the content stage must fill.
fn template_candidates(config: &RuntimeConfig, theme: &str) -> Result<Vec<TemplateCandidate>> {
    let report = discover_theme(config, theme)?;
    let components_dir = config.theme_dir(theme).join(&config.theme.components_dir);

    report
        .manifest
        .main_components()
        .into_iter()
        .map(|meta| {
            let path = components_dir.join(&meta.source);
            let source = fs::read_to_string(&path)
                .with_context(|| format!("failed to read `{}`", path.display()))?;
            Ok(TemplateCandidate {
                name: meta.type_tag.clone(),
                description: meta.description.clone(),
                source,
            })
        })
        .collect()
}
