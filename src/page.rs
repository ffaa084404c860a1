//! The page tree: top-level pages, their sub pages, and unlinked pages.
//!
//! Every node knows how deep its output file sits below the site root, which
//! is all the link algebra needs. Production links are server-root-relative
//! and extension-less (`/docs/cli`); debug links are file-system-relative and
//! keep the `.html` suffix (`../docs/cli.html`) so the output tree can be
//! browsed without a server.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use serde::Serialize;

use crate::{
    context::PageContext,
    error::{Error, PageError},
    markdown::MarkdownConverter,
    settings::{SiteSettings, UrlStyle},
    template::Renderer,
};

/// Stylesheet served from the site root in production.
pub const PRODUCTION_STYLESHEET: &str = "/main.min.css";
/// Stylesheet file name at the root of the output tree in debug mode.
pub const DEBUG_STYLESHEET: &str = "main.css";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageKind {
    Page,
    SubPage,
    UnlinkedPage,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageKind::Page => "Page",
            PageKind::SubPage => "SubPage",
            PageKind::UnlinkedPage => "UnlinkedPage",
        };
        f.write_str(name)
    }
}

/// State filled in while a page is generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOutput {
    pub body_content: Option<String>,
    pub css_path: Option<String>,
    pub html: Option<String>,
}

pub trait PageNode {
    fn title(&self) -> &str;
    fn file_name(&self) -> &str;
    fn kind(&self) -> PageKind;
    fn output(&self) -> &PageOutput;
    fn output_mut(&mut self) -> &mut PageOutput;

    /// Relative prefix leading from this page's output file back to the
    /// output root, always ending in `/`.
    fn path_to_root(&self, url_style: UrlStyle) -> String;

    /// The link `from` should use to reach this page.
    fn relative_path(&self, from: &dyn PageNode, url_style: UrlStyle, debug: bool) -> String;

    /// Directory this page's html file is written to.
    fn output_dir(&self, site_dir: &Path, url_style: UrlStyle) -> PathBuf;

    fn parent_page(&self) -> Option<&str> {
        None
    }

    /// Markdown used as body when no source file exists.
    fn fallback_markdown(&self, _url_style: UrlStyle) -> Option<String> {
        None
    }

    fn set_content_from_md(
        &mut self,
        settings: &SiteSettings,
        markdown: &MarkdownConverter,
    ) -> Result<(), Error> {
        let source = settings
            .markdown_dir
            .join(format!("{}.md", self.file_name()));

        let body_content = if source.is_file() {
            markdown.convert(&fs::read_to_string(&source)?)?
        } else if let Some(menu) = self.fallback_markdown(settings.url_style) {
            markdown.convert(&menu)?
        } else {
            String::new()
        };

        self.output_mut().body_content = Some(body_content);
        Ok(())
    }

    fn set_css_path(&mut self, debug: bool, url_style: UrlStyle) {
        let css_path = if debug {
            format!("{}{}", self.path_to_root(url_style), DEBUG_STYLESHEET)
        } else {
            PRODUCTION_STYLESHEET.to_string()
        };
        self.output_mut().css_path = Some(css_path);
    }

    /// Writes the rendered html below `site_dir`, creating directories as
    /// needed, and returns the written file.
    fn save_html(&self, site_dir: &Path, url_style: UrlStyle) -> Result<PathBuf, Error> {
        let html = self
            .output()
            .html
            .as_deref()
            .ok_or_else(|| Error::NotRendered(self.file_name().to_string()))?;

        let dir = self.output_dir(site_dir, url_style);
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.html", self.file_name()));
        fs::write(&path, html)?;

        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    title: String,
    file_name: String,
    sub_pages: Vec<SubPage>,
    pub output: PageOutput,
}

impl Page {
    pub fn new(title: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file_name: file_name.into(),
            sub_pages: vec![],
            output: PageOutput::default(),
        }
    }

    /// Fails when any child is not a [`SubPage`].
    pub fn with_children(
        title: impl Into<String>,
        file_name: impl Into<String>,
        children: impl IntoIterator<Item = SiteNode>,
    ) -> Result<Self, PageError> {
        let mut page = Self::new(title, file_name);

        for child in children {
            match child {
                SiteNode::SubPage(sub_page) => page.sub_pages.push(sub_page),
                other => {
                    return Err(PageError::NotASubPage {
                        parent: page.file_name,
                        child: other.file_name().to_string(),
                        kind: other.kind(),
                    })
                }
            }
        }

        Ok(page)
    }

    /// The declared children. The page registry holds its own copies of
    /// these, which are the ones that get rendered; both sets are linked to
    /// this page by [`crate::site::Website::set_parent_pages`].
    pub fn sub_pages(&self) -> &[SubPage] {
        &self.sub_pages
    }

    /// Markdown list linking every sub page, used as body of pages that
    /// have no content of their own.
    pub fn generate_content_menu(&self, url_style: UrlStyle) -> String {
        let mut content = format!("#{}\n", self.title);

        for sub_page in &self.sub_pages {
            let url = match url_style {
                UrlStyle::Flat => format!("./{}.html", sub_page.file_name),
                UrlStyle::Nested => format!("./{}/{}.html", self.file_name, sub_page.file_name),
            };
            content.push_str(&format!("- [{}]({})\n", sub_page.title, url));
        }

        content
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

impl PageNode for Page {
    fn title(&self) -> &str {
        &self.title
    }

    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn kind(&self) -> PageKind {
        PageKind::Page
    }

    fn output(&self) -> &PageOutput {
        &self.output
    }

    fn output_mut(&mut self) -> &mut PageOutput {
        &mut self.output
    }

    fn path_to_root(&self, _url_style: UrlStyle) -> String {
        "./".to_string()
    }

    fn relative_path(&self, from: &dyn PageNode, url_style: UrlStyle, debug: bool) -> String {
        if !debug {
            return if self.file_name == "index" {
                "/".to_string()
            } else {
                format!("/{}", self.file_name)
            };
        }

        format!("{}{}.html", from.path_to_root(url_style), self.file_name)
    }

    fn output_dir(&self, site_dir: &Path, _url_style: UrlStyle) -> PathBuf {
        site_dir.to_path_buf()
    }

    fn fallback_markdown(&self, url_style: UrlStyle) -> Option<String> {
        // CommonMark needs the space after `#` to read the title as a heading
        (!self.sub_pages.is_empty())
            .then(|| self.generate_content_menu(url_style).replacen('#', "# ", 1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubPage {
    title: String,
    file_name: String,
    parent_page: OnceLock<String>,
    pub output: PageOutput,
}

impl SubPage {
    pub fn new(title: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file_name: file_name.into(),
            parent_page: OnceLock::new(),
            output: PageOutput::default(),
        }
    }

    /// Records the owning page. Only the first call has an effect; returns
    /// whether this call set it.
    pub fn link_parent(&self, parent_file_name: &str) -> bool {
        self.parent_page.set(parent_file_name.to_string()).is_ok()
    }

    /// Directory named after the parent, when the style nests sub pages.
    fn nested_dir(&self, url_style: UrlStyle) -> Option<&str> {
        match url_style {
            UrlStyle::Nested => self.parent_page.get().map(String::as_str),
            UrlStyle::Flat => None,
        }
    }
}

impl PageNode for SubPage {
    fn title(&self) -> &str {
        &self.title
    }

    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn kind(&self) -> PageKind {
        PageKind::SubPage
    }

    fn output(&self) -> &PageOutput {
        &self.output
    }

    fn output_mut(&mut self) -> &mut PageOutput {
        &mut self.output
    }

    fn parent_page(&self) -> Option<&str> {
        self.parent_page.get().map(String::as_str)
    }

    fn path_to_root(&self, url_style: UrlStyle) -> String {
        match self.nested_dir(url_style) {
            Some(_) => "../".to_string(),
            None => "./".to_string(),
        }
    }

    fn relative_path(&self, from: &dyn PageNode, url_style: UrlStyle, debug: bool) -> String {
        let site_path = match self.nested_dir(url_style) {
            Some(parent) => format!("{}/{}", parent, self.file_name),
            None => self.file_name.clone(),
        };

        if debug {
            format!("{}{}.html", from.path_to_root(url_style), site_path)
        } else {
            format!("/{}", site_path)
        }
    }

    fn output_dir(&self, site_dir: &Path, url_style: UrlStyle) -> PathBuf {
        match self.nested_dir(url_style) {
            Some(parent) => site_dir.join(parent),
            None => site_dir.to_path_buf(),
        }
    }
}

/// Conversion into the directory segments of an [`UnlinkedPage`].
pub trait IntoPathSegments {
    fn into_segments(self) -> Vec<String>;
}

impl IntoPathSegments for &str {
    fn into_segments(self) -> Vec<String> {
        self.split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl IntoPathSegments for String {
    fn into_segments(self) -> Vec<String> {
        self.as_str().into_segments()
    }
}

impl IntoPathSegments for Vec<String> {
    fn into_segments(self) -> Vec<String> {
        self.iter()
            .flat_map(|segment| segment.as_str().into_segments())
            .collect()
    }
}

impl IntoPathSegments for &[&str] {
    fn into_segments(self) -> Vec<String> {
        self.iter().flat_map(|segment| (*segment).into_segments()).collect()
    }
}

impl<const N: usize> IntoPathSegments for [&str; N] {
    fn into_segments(self) -> Vec<String> {
        self.as_slice().into_segments()
    }
}

/// A page left out of every navigation menu, written to an arbitrary
/// subdirectory of the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlinkedPage {
    title: String,
    file_name: String,
    path: Vec<String>,
    pub output: PageOutput,
}

impl UnlinkedPage {
    pub fn new(
        title: impl Into<String>,
        file_name: impl Into<String>,
        path: impl IntoPathSegments,
    ) -> Self {
        Self {
            title: title.into(),
            file_name: file_name.into(),
            path: path.into_segments(),
            output: PageOutput::default(),
        }
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    fn site_path(&self) -> String {
        if self.path.is_empty() {
            self.file_name.clone()
        } else {
            format!("{}/{}", self.path.join("/"), self.file_name)
        }
    }
}

impl PageNode for UnlinkedPage {
    fn title(&self) -> &str {
        &self.title
    }

    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn kind(&self) -> PageKind {
        PageKind::UnlinkedPage
    }

    fn output(&self) -> &PageOutput {
        &self.output
    }

    fn output_mut(&mut self) -> &mut PageOutput {
        &mut self.output
    }

    fn path_to_root(&self, _url_style: UrlStyle) -> String {
        if self.path.is_empty() {
            "./".to_string()
        } else {
            "../".repeat(self.path.len())
        }
    }

    fn relative_path(&self, from: &dyn PageNode, url_style: UrlStyle, debug: bool) -> String {
        if debug {
            format!("{}{}.html", from.path_to_root(url_style), self.site_path())
        } else {
            format!("/{}", self.site_path())
        }
    }

    fn output_dir(&self, site_dir: &Path, _url_style: UrlStyle) -> PathBuf {
        self.path
            .iter()
            .fold(site_dir.to_path_buf(), |dir, segment| dir.join(segment))
    }
}

/// Any node of the page registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteNode {
    Page(Page),
    SubPage(SubPage),
    Unlinked(UnlinkedPage),
}

impl SiteNode {
    fn node(&self) -> &dyn PageNode {
        match self {
            SiteNode::Page(page) => page,
            SiteNode::SubPage(page) => page,
            SiteNode::Unlinked(page) => page,
        }
    }

    fn node_mut(&mut self) -> &mut dyn PageNode {
        match self {
            SiteNode::Page(page) => page,
            SiteNode::SubPage(page) => page,
            SiteNode::Unlinked(page) => page,
        }
    }

    pub fn as_page(&self) -> Option<&Page> {
        match self {
            SiteNode::Page(page) => Some(page),
            _ => None,
        }
    }

    pub fn render_html(&mut self, context: &PageContext, renderer: &Renderer) -> Result<(), Error> {
        let html = renderer.render(self, context)?;
        self.output_mut().html = Some(html);
        Ok(())
    }
}

impl PageNode for SiteNode {
    fn title(&self) -> &str {
        self.node().title()
    }

    fn file_name(&self) -> &str {
        self.node().file_name()
    }

    fn kind(&self) -> PageKind {
        self.node().kind()
    }

    fn output(&self) -> &PageOutput {
        self.node().output()
    }

    fn output_mut(&mut self) -> &mut PageOutput {
        self.node_mut().output_mut()
    }

    fn parent_page(&self) -> Option<&str> {
        self.node().parent_page()
    }

    fn path_to_root(&self, url_style: UrlStyle) -> String {
        self.node().path_to_root(url_style)
    }

    fn relative_path(&self, from: &dyn PageNode, url_style: UrlStyle, debug: bool) -> String {
        self.node().relative_path(from, url_style, debug)
    }

    fn output_dir(&self, site_dir: &Path, url_style: UrlStyle) -> PathBuf {
        self.node().output_dir(site_dir, url_style)
    }

    fn fallback_markdown(&self, url_style: UrlStyle) -> Option<String> {
        self.node().fallback_markdown(url_style)
    }
}

impl From<Page> for SiteNode {
    fn from(page: Page) -> Self {
        SiteNode::Page(page)
    }
}

impl From<SubPage> for SiteNode {
    fn from(page: SubPage) -> Self {
        SiteNode::SubPage(page)
    }
}

impl From<UnlinkedPage> for SiteNode {
    fn from(page: UnlinkedPage) -> Self {
        SiteNode::Unlinked(page)
    }
}
