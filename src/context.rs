use serde::Serialize;

use crate::{
    page::{PageKind, PageNode, SiteNode},
    settings::{SiteSettings, UrlStyle},
};

/// Entry of the primary navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub title: String,
    pub file_name: String,
}

/// The top-level pages of `pages`, in order.
pub fn navigation(pages: &[SiteNode]) -> Vec<NavEntry> {
    pages
        .iter()
        .filter_map(SiteNode::as_page)
        .map(|page| NavEntry {
            title: page.title().to_string(),
            file_name: page.file_name().to_string(),
        })
        .collect()
}

/// Everything `structure.html` gets to see while rendering one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContext {
    pub debug: bool,
    pub site_description: String,
    pub site_author: String,
    pub site_keywords: String,
    pub site_title: String,
    pub site_subtitle: String,
    pub page_title: String,
    pub page_type: PageKind,
    pub file_name: String,
    pub back_path: String,
    pub body_content: String,
    pub current_year: i32,
    pub pages: Vec<NavEntry>,
    pub active_nav_links: Vec<String>,
    pub url_style: UrlStyle,
    pub css_path: String,
}

impl PageContext {
    pub fn assemble(
        settings: &SiteSettings,
        navigation: &[NavEntry],
        page: &dyn PageNode,
        current_year: i32,
    ) -> Self {
        let mut active_nav_links = vec![page.file_name().to_string()];
        if let Some(parent) = page.parent_page() {
            active_nav_links.push(parent.to_string());
        }

        let output = page.output();

        Self {
            debug: settings.debug,
            site_description: settings.description.clone(),
            site_author: settings.author.clone(),
            site_keywords: settings.keywords.clone(),
            site_title: settings.title.clone(),
            site_subtitle: settings.subtitle.replace(' ', "&nbsp;"),
            page_title: page.title().to_string(),
            page_type: page.kind(),
            file_name: page.file_name().to_string(),
            back_path: page.path_to_root(settings.url_style),
            body_content: output.body_content.clone().unwrap_or_default(),
            current_year,
            pages: navigation.to_vec(),
            active_nav_links,
            url_style: settings.url_style,
            css_path: output.css_path.clone().unwrap_or_default(),
        }
    }

    pub fn to_tera(&self) -> tera::Result<tera::Context> {
        tera::Context::from_serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Page, SubPage, UnlinkedPage};

    fn settings() -> SiteSettings {
        let mut map = toml::Table::new();
        map.insert("root_dir".into(), "root".into());
        map.insert("project_name".into(), "test".into());
        map.insert("site_subtitle".into(), "a static site".into());
        map.insert("url_style".into(), "nested".into());
        SiteSettings::from_map(&map)
            .unwrap()
            .with_pages(vec![
                Page::with_children("Docs", "doc", vec![SubPage::new("CLI", "cli").into()])
                    .unwrap()
                    .into(),
                UnlinkedPage::new("Hidden", "hidden", "x").into(),
                Page::new("Contact", "contact").into(),
            ])
            .unwrap()
    }

    #[test]
    fn navigation_lists_top_level_pages_only() {
        let nav = navigation(&settings().pages);
        let names: Vec<&str> = nav.iter().map(|entry| entry.file_name.as_str()).collect();
        assert_eq!(names, ["doc", "contact"]);
    }

    #[test]
    fn sub_pages_activate_their_parent() {
        let settings = settings();
        let nav = navigation(&settings.pages);

        let mut sub_page = SubPage::new("CLI", "cli");
        sub_page.link_parent("doc");
        sub_page.set_css_path(true, UrlStyle::Nested);
        sub_page.output.body_content = Some("<p>body</p>".into());

        let context = PageContext::assemble(&settings, &nav, &sub_page, 2024);
        assert_eq!(context.active_nav_links, ["cli", "doc"]);
        assert_eq!(context.page_type, PageKind::SubPage);
        assert_eq!(context.css_path, "../main.css");
        assert_eq!(context.back_path, "../");
        assert_eq!(context.body_content, "<p>body</p>");
        assert_eq!(context.site_subtitle, "a&nbsp;static&nbsp;site");
        assert_eq!(context.site_title, "test");
        assert_eq!(context.current_year, 2024);
        assert_eq!(context.pages, nav);
    }

    #[test]
    fn assembly_is_reproducible() {
        let settings = settings();
        let nav = navigation(&settings.pages);
        let page = Page::new("Contact", "contact");

        let first = PageContext::assemble(&settings, &nav, &page, 2024);
        assert_eq!(first, PageContext::assemble(&settings, &nav, &page, 2024));
        assert_eq!(first.active_nav_links, ["contact"]);
        assert_eq!(first.body_content, "");
    }

    #[test]
    fn tera_context_uses_template_names() {
        let settings = settings();
        let page = Page::new("Contact", "contact");
        let context = PageContext::assemble(&settings, &[], &page, 2024)
            .to_tera()
            .unwrap()
            .into_json();

        assert_eq!(context["page_type"], "Page");
        assert_eq!(context["url_style"], "nested");
        assert_eq!(context["page_title"], "Contact");
    }
}
