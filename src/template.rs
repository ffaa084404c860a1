use std::{path::PathBuf, sync::Arc};

use tera::Tera;

use crate::{
    context::PageContext,
    error::Error,
    functions::{markdown::Markdown, static_asset::Static, url::Url},
    markdown::MarkdownConverter,
    page::{PageNode, SiteNode},
    settings::{SiteSettings, TemplateSource, UrlStyle},
};

/// Name of the template every page is rendered with.
pub const STRUCTURE_TEMPLATE: &str = "structure.html";

/// Templates compiled into the crate, used when a project has none.
pub const BUNDLED_TEMPLATES: &[(&str, &str)] = &[(
    STRUCTURE_TEMPLATE,
    include_str!("../templates/structure.html"),
)];

fn setup_template_engine(source: &TemplateSource) -> Result<Tera, Error> {
    let mut tera = match source {
        TemplateSource::Bundled => {
            let mut tera = Tera::default();
            tera.add_raw_templates(BUNDLED_TEMPLATES.iter().copied())?;
            tera
        }
        TemplateSource::Directory(dir) => {
            Tera::new(&dir.join("**").join("*").to_string_lossy())?
        }
    };
    // context values are site-author html and relative paths
    tera.autoescape_on(vec![]);

    tracing::debug!(
        templates = ?tera.get_template_names().collect::<Vec<_>>(),
        "loaded templates"
    );

    Ok(tera)
}

/// Renders pages through `structure.html`.
///
/// `url()` and `static()` are bound to the page being rendered, so each
/// render works on its own copy of the engine.
pub struct Renderer {
    tera: Tera,
    pages: Arc<[SiteNode]>,
    static_dir: PathBuf,
    site_dir: PathBuf,
    url_style: UrlStyle,
    debug: bool,
}

impl Renderer {
    /// Snapshots the page registry for link lookups, so sub pages must
    /// already know their parent.
    pub fn new(settings: &SiteSettings, markdown: Arc<MarkdownConverter>) -> Result<Self, Error> {
        let mut tera = setup_template_engine(&settings.templates)?;
        tera.register_filter("markdown", Markdown::new(markdown));

        Ok(Self {
            tera,
            pages: settings.pages.clone().into(),
            static_dir: settings.static_dir.clone(),
            site_dir: settings.site_dir.clone(),
            url_style: settings.url_style,
            debug: settings.debug,
        })
    }

    pub fn render(&self, page: &SiteNode, context: &PageContext) -> Result<String, Error> {
        let mut tera = self.tera.clone();

        tera.register_function(
            "url",
            Url::new(self.pages.clone(), page.clone(), self.url_style, self.debug),
        );
        tera.register_function(
            "static",
            Static::new(
                page.path_to_root(self.url_style),
                self.static_dir.clone(),
                &self.site_dir,
                self.debug,
            ),
        );

        Ok(tera.render(STRUCTURE_TEMPLATE, &context.to_tera()?)?)
    }
}
