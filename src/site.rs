use std::{path::PathBuf, sync::Arc};

use chrono::Datelike;

use crate::{
    context::{navigation, NavEntry, PageContext},
    error::Error,
    markdown::MarkdownConverter,
    page::{PageNode, SiteNode},
    settings::SiteSettings,
    template::Renderer,
};

/// One generation run over a resolved site.
pub struct Website {
    settings: SiteSettings,
}

impl Website {
    pub fn new(settings: &toml::Table) -> Result<Self, Error> {
        Ok(Self::from_settings(SiteSettings::from_map(settings)?))
    }

    pub fn from_settings(settings: SiteSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    pub fn pages(&self) -> &[SiteNode] {
        &self.settings.pages
    }

    /// Tells every sub page in the registry which page owns it.
    pub fn set_parent_pages(&mut self) {
        let mut owners = Vec::new();
        for page in self.settings.top_level_pages() {
            for sub_page in page.sub_pages() {
                sub_page.link_parent(page.file_name());
                owners.push((sub_page.file_name().to_string(), page.file_name().to_string()));
            }
        }

        for node in &self.settings.pages {
            if let SiteNode::SubPage(sub_page) = node {
                if let Some((_, parent)) = owners.iter().find(|(child, _)| child == sub_page.file_name()) {
                    sub_page.link_parent(parent);
                }
            }
        }
    }

    /// Generates every page of the site and returns the written files in
    /// registry order. Files written before a failure stay on disk.
    pub fn generate_pages(&mut self) -> Result<Vec<PathBuf>, Error> {
        self.set_parent_pages();

        let markdown = Arc::new(MarkdownConverter::new(&self.settings.markdown_extensions)?);
        let renderer = Renderer::new(&self.settings, markdown.clone())?;
        let navigation = navigation(&self.settings.pages);
        let current_year = chrono::Local::now().year();

        let mut pages = std::mem::take(&mut self.settings.pages);
        let result: Result<Vec<_>, _> = pages
            .iter_mut()
            .map(|page| {
                generate_page(
                    &self.settings,
                    &navigation,
                    &markdown,
                    &renderer,
                    page,
                    current_year,
                )
            })
            .collect();
        self.settings.pages = pages;

        result
    }
}

fn generate_page(
    settings: &SiteSettings,
    navigation: &[NavEntry],
    markdown: &MarkdownConverter,
    renderer: &Renderer,
    page: &mut SiteNode,
    current_year: i32,
) -> Result<PathBuf, Error> {
    page.set_content_from_md(settings, markdown)?;
    page.set_css_path(settings.debug, settings.url_style);

    let context = PageContext::assemble(settings, navigation, page, current_year);
    page.render_html(&context, renderer)?;

    let path = page.save_html(&settings.site_dir, settings.url_style)?;

    tracing::info!(page = page.file_name(), path = %path.display(), "generated page");

    Ok(path)
}
