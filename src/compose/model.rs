//! Site, page, template and block data model.
//!
//! These mirror the persistence layer's read models. The composer only
//! reads them; nothing here is written back.

use crate::config::defaults;
use crate::registry::Props;
use serde::{Deserialize, Serialize};

/// Role a template is classified under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateRole {
    Header,
    Footer,
    Page,
    Post,
}

/// A single positioned, visibility-flagged reference to a component
/// instance with its props.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: String,

    /// Component type tag looked up in the active theme's registry.
    pub component: String,

    #[serde(default)]
    pub props: Props,

    #[serde(default)]
    pub order: i64,

    #[serde(default = "defaults::r#true")]
    pub visible: bool,
}

/// An ordered, role-classified list of blocks usable across pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub role: TemplateRole,

    /// At most one template per role per site should carry this flag.
    #[serde(default)]
    pub default_for_role: bool,

    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Publication status of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
}

/// A page: its own blocks plus optional per-role template overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: String,

    pub slug: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub status: PageStatus,

    /// Template id overriding the site default for the header region.
    #[serde(default)]
    pub header_template: Option<String>,

    /// Template id overriding the site default for the footer region.
    #[serde(default)]
    pub footer_template: Option<String>,

    /// Template id overriding the site default for the page body.
    #[serde(default)]
    pub page_template: Option<String>,

    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// A site read model: identity, brand context, templates and pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub industry: String,

    #[serde(default)]
    pub style_preference: Option<String>,

    #[serde(default)]
    pub brand_personality: Option<String>,

    #[serde(default)]
    pub templates: Vec<Template>,

    #[serde(default)]
    pub pages: Vec<Page>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_visible_defaults_to_true() {
        let block: Block = serde_json::from_str(
            r#"{ "id": "b1", "component": "hero", "order": 1 }"#,
        )
        .unwrap();
        assert!(block.visible);
        assert!(block.props.is_empty());
    }

    #[test]
    fn test_page_status_defaults_to_draft() {
        let page: Page = serde_json::from_str(r#"{ "id": "p1", "slug": "home" }"#).unwrap();
        assert_eq!(page.status, PageStatus::Draft);
        assert!(page.header_template.is_none());
    }

    #[test]
    fn test_site_from_toml_fixture() {
        let site: Site = toml::from_str(
            r#"
            id = "acme"
            name = "Acme"
            industry = "hardware"

            [[templates]]
            id = "t-head"
            role = "header"
            default_for_role = true

            [[templates.blocks]]
            id = "b1"
            component = "nav-bar"
            props = { links = ["Home", "About"] }

            [[pages]]
            id = "home"
            slug = ""
            title = "Home"
            status = "published"
            "#,
        )
        .unwrap();

        assert_eq!(site.templates.len(), 1);
        assert_eq!(site.templates[0].role, TemplateRole::Header);
        assert!(site.templates[0].default_for_role);
        assert_eq!(site.pages[0].status, PageStatus::Published);
        assert!(site.templates[0].blocks[0].props.contains_key("links"));
    }
}
