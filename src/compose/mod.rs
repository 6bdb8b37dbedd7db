//! Template composition: turning a page plus its resolved templates into
//! an ordered render tree.
//!
//! # Resolution
//!
//! Per region (header / footer / page body):
//!
//! 1. the page's explicit template id for that role,
//! 2. else the site's default-for-role template,
//! 3. else the region contributes nothing.
//!
//! # Page body splice
//!
//! ```text
//! template blocks:  [nav] [banner] [page-content] [cta]
//! page blocks:             [intro] [pricing]
//!                              │
//!                              ▼
//! rendered body:    [nav] [banner] [intro] [pricing] [cta]
//! ```
//!
//! Composition is pure: it reads registry/template/page state and writes
//! nothing, so independent requests can compose concurrently against the
//! same loaded snapshot.

pub mod model;
pub mod store;

pub use model::{Block, Page, PageStatus, Site, Template, TemplateRole};
pub use store::{InMemoryStore, SiteStore};

use crate::registry::{RegistrySnapshot, escape_attr};

// ============================================================================
// Render tree
// ============================================================================

/// One rendered block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderNode {
    /// Component type tag that produced this node.
    pub component: String,
    /// Rendered markup.
    pub html: String,
}

/// Ordered render output of one page, split by region.
#[derive(Debug, Clone, Default)]
pub struct RenderTree {
    pub header: Vec<RenderNode>,
    pub body: Vec<RenderNode>,
    pub footer: Vec<RenderNode>,
}

impl RenderTree {
    /// Serialize the tree as an HTML fragment. Empty regions are omitted.
    pub fn to_html(&self) -> String {
        let mut html = String::new();

        for (tag, nodes) in [
            ("header", &self.header),
            ("main", &self.body),
            ("footer", &self.footer),
        ] {
            if nodes.is_empty() {
                continue;
            }
            html.push_str(&format!("<{tag}>\n"));
            for node in nodes {
                html.push_str(&node.html);
                html.push('\n');
            }
            html.push_str(&format!("</{tag}>\n"));
        }

        html
    }
}

// ============================================================================
// Composer
// ============================================================================

/// Composes pages and templates against one registry snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Composer<'a> {
    registry: &'a RegistrySnapshot,
    /// Reserved type tag marking the page-content splice point.
    marker: &'a str,
    /// Template-preview mode: the marker renders an illustrative region
    /// instead of being inert.
    preview: bool,
}

impl<'a> Composer<'a> {
    pub fn new(registry: &'a RegistrySnapshot, marker: &'a str) -> Self {
        Self {
            registry,
            marker,
            preview: false,
        }
    }

    /// Enable template-preview rendering.
    pub fn preview(mut self) -> Self {
        self.preview = true;
        self
    }

    /// Compose a page into its render tree.
    pub fn compose_page<S: SiteStore>(&self, page: &Page, store: &S) -> RenderTree {
        let header = self
            .resolve(store, page.header_template.as_deref(), TemplateRole::Header)
            .map(|t| self.render_blocks(&t.blocks))
            .unwrap_or_default();

        let footer = self
            .resolve(store, page.footer_template.as_deref(), TemplateRole::Footer)
            .map(|t| self.render_blocks(&t.blocks))
            .unwrap_or_default();

        let body = match self.resolve(store, page.page_template.as_deref(), TemplateRole::Page) {
            Some(template) if contains_marker(&template.blocks, self.marker) => {
                self.splice(template, page)
            }
            // No marker, or no page-body template at all: the page's own
            // blocks render directly, unwrapped.
            _ => self.render_blocks(&page.blocks),
        };

        RenderTree {
            header,
            body,
            footer,
        }
    }

    /// Render a template standalone, with the content marker shown as an
    /// illustrative placeholder region.
    pub fn compose_template(&self, template: &Template) -> Vec<RenderNode> {
        self.preview().render_blocks(&template.blocks)
    }

    /// Resolve a template for one region.
    fn resolve<'s, S: SiteStore>(
        &self,
        store: &'s S,
        explicit: Option<&str>,
        role: TemplateRole,
    ) -> Option<&'s Template> {
        explicit
            .and_then(|id| store.template(id))
            .or_else(|| store.default_template(role))
    }

    /// Sort, filter and render a block list.
    fn render_blocks(&self, blocks: &[Block]) -> Vec<RenderNode> {
        ordered_visible(blocks)
            .into_iter()
            .filter_map(|block| self.render_block(block))
            .collect()
    }

    /// Render the page body by substituting the page's own blocks at the
    /// marker's position. Every other template block renders as itself.
    fn splice(&self, template: &Template, page: &Page) -> Vec<RenderNode> {
        let mut body = Vec::new();
        let mut spliced = false;

        for block in ordered_visible(&template.blocks) {
            if block.component == self.marker {
                // Substitute exactly once; further markers are inert.
                if !spliced {
                    body.extend(self.render_blocks(&page.blocks));
                    spliced = true;
                }
                continue;
            }
            if let Some(node) = self.render_block(block) {
                body.push(node);
            }
        }

        body
    }

    /// Render one block, or nothing.
    ///
    /// Nothing is rendered for a content marker outside preview mode and
    /// for a type tag absent from the registry: a single stale block must
    /// never fail the whole page.
    fn render_block(&self, block: &Block) -> Option<RenderNode> {
        if block.component == self.marker {
            if !self.preview {
                return None;
            }
            return Some(RenderNode {
                component: self.marker.to_owned(),
                html: format!(
                    "<div class=\"content-region\" data-component=\"{}\">Page content renders here</div>",
                    escape_attr(self.marker)
                ),
            });
        }

        let entry = self.registry.get(&block.component)?;
        Some(RenderNode {
            component: block.component.clone(),
            html: (entry.render)(&entry.meta, &block.props),
        })
    }
}

/// Whether a template contains a visible content marker. An invisible
/// marker is filtered out before the splice, so it does not count.
fn contains_marker(blocks: &[Block], marker: &str) -> bool {
    blocks.iter().any(|b| b.visible && b.component == marker)
}

/// Blocks sorted ascending by `order` (stable: ties keep list order),
/// with invisible blocks filtered out.
fn ordered_visible(blocks: &[Block]) -> Vec<&Block> {
    let mut out: Vec<&Block> = blocks.iter().filter(|b| b.visible).collect();
    out.sort_by_key(|b| b.order);
    out
}
