//! Persistence collaborator interface for composition.
//!
//! The real platform resolves pages and default templates from its
//! database; the composer only needs these two reads. The in-memory
//! implementation backs tests and the CLI's site fixtures.

use super::model::{Page, Site, Template, TemplateRole};

/// Read access to a site's pages and templates.
///
/// Implementations are scoped to one site.
pub trait SiteStore {
    /// Page by id.
    fn page(&self, page_id: &str) -> Option<&Page>;

    /// Template by id.
    fn template(&self, template_id: &str) -> Option<&Template>;

    /// The template flagged default-for-role, if any.
    fn default_template(&self, role: TemplateRole) -> Option<&Template>;
}

/// In-memory store over a loaded [`Site`] read model.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    site: Site,
}

impl InMemoryStore {
    pub fn new(site: Site) -> Self {
        Self { site }
    }

    pub fn site(&self) -> &Site {
        &self.site
    }
}

impl SiteStore for InMemoryStore {
    fn page(&self, page_id: &str) -> Option<&Page> {
        self.site.pages.iter().find(|p| p.id == page_id)
    }

    fn template(&self, template_id: &str) -> Option<&Template> {
        self.site.templates.iter().find(|t| t.id == template_id)
    }

    fn default_template(&self, role: TemplateRole) -> Option<&Template> {
        self.site
            .templates
            .iter()
            .find(|t| t.role == role && t.default_for_role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Site {
        Site {
            id: "acme".into(),
            name: "Acme".into(),
            industry: String::new(),
            style_preference: None,
            brand_personality: None,
            templates: vec![
                Template {
                    id: "t-head".into(),
                    name: "Header".into(),
                    role: TemplateRole::Header,
                    default_for_role: true,
                    blocks: vec![],
                },
                Template {
                    id: "t-head-alt".into(),
                    name: "Alt Header".into(),
                    role: TemplateRole::Header,
                    default_for_role: false,
                    blocks: vec![],
                },
            ],
            pages: vec![Page {
                id: "home".into(),
                slug: String::new(),
                title: "Home".into(),
                status: Default::default(),
                header_template: None,
                footer_template: None,
                page_template: None,
                blocks: vec![],
            }],
        }
    }

    #[test]
    fn test_lookups() {
        let store = InMemoryStore::new(site());

        assert!(store.page("home").is_some());
        assert!(store.page("missing").is_none());
        assert_eq!(store.template("t-head-alt").unwrap().name, "Alt Header");
        assert_eq!(
            store.default_template(TemplateRole::Header).unwrap().id,
            "t-head"
        );
        assert!(store.default_template(TemplateRole::Footer).is_none());
    }
}
