//! Resolution of the sparse settings map into a [`SiteSettings`].
//!
//! The map is the parsed `settings.toml` of a project: lower-case keys, any
//! of which may be missing except `root_dir` and `project_name`. Every other
//! key falls back to a default derived from the required ones.

use std::{collections::HashSet, path::PathBuf};

use serde::Serialize;
use toml::{Table, Value};

use crate::{
    error::{PageError, SettingsError},
    page::{IntoPathSegments, Page, PageNode, SiteNode, SubPage, UnlinkedPage},
};

/// Every key the resolver understands.
pub const RECOGNIZED_SETTINGS: &[&str] = &[
    "root_dir",
    "project_name",
    "debug",
    "url_style",
    "templates_dir",
    "static_dir",
    "markdown_dir",
    "markdown_extensions",
    "site_dir",
    "title",
    "site_title",
    "subtitle",
    "site_subtitle",
    "description",
    "author",
    "keywords",
    "pages",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlStyle {
    #[default]
    Flat,
    Nested,
}

impl UrlStyle {
    /// Unrecognized names fall back to [`UrlStyle::Flat`].
    pub fn parse(name: &str) -> Self {
        match name {
            "flat" => UrlStyle::Flat,
            "nested" => UrlStyle::Nested,
            other => {
                tracing::warn!(url_style = other, "unknown url style, using flat");
                UrlStyle::Flat
            }
        }
    }
}

/// Where `structure.html` comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TemplateSource {
    /// The templates compiled into this crate.
    #[default]
    Bundled,
    Directory(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    pub root_dir: PathBuf,
    pub project_name: String,
    pub debug: bool,
    pub url_style: UrlStyle,
    pub templates: TemplateSource,
    pub static_dir: PathBuf,
    pub markdown_dir: PathBuf,
    pub markdown_extensions: Vec<String>,
    /// Output root, `root_dir` unless overridden.
    pub site_dir: PathBuf,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub keywords: String,
    /// Pages in declaration order, each page followed by its sub pages.
    pub pages: Vec<SiteNode>,
}

impl SiteSettings {
    pub fn from_map(settings: &Table) -> Result<Self, SettingsError> {
        for key in settings.keys() {
            if !RECOGNIZED_SETTINGS.contains(&key.as_str()) {
                tracing::warn!(setting = %key, "ignoring unknown setting");
            }
        }

        let root_dir = PathBuf::from(
            string_setting(settings, "root_dir")?
                .ok_or(SettingsError::SettingNotFound("root_dir"))?,
        );
        let project_name = string_setting(settings, "project_name")?
            .ok_or(SettingsError::SettingNotFound("project_name"))?;

        let url_style = string_setting(settings, "url_style")?
            .map(|style| UrlStyle::parse(&style))
            .unwrap_or_default();

        let templates = string_setting(settings, "templates_dir")?
            .map(|dir| TemplateSource::Directory(dir.into()))
            .unwrap_or_default();

        let title = match string_setting(settings, "title")? {
            Some(title) => Some(title),
            None => string_setting(settings, "site_title")?,
        };
        let subtitle = match string_setting(settings, "subtitle")? {
            Some(subtitle) => Some(subtitle),
            None => string_setting(settings, "site_subtitle")?,
        };

        let pages = match settings.get("pages") {
            Some(value) => parse_pages(value)?,
            None => vec![],
        };

        Ok(Self {
            debug: bool_setting(settings, "debug")?.unwrap_or(false),
            url_style,
            templates,
            static_dir: path_setting(settings, "static_dir")?
                .unwrap_or_else(|| root_dir.join("static")),
            markdown_dir: path_setting(settings, "markdown_dir")?
                .unwrap_or_else(|| root_dir.join("md")),
            markdown_extensions: markdown_extensions(settings)?,
            site_dir: path_setting(settings, "site_dir")?.unwrap_or_else(|| root_dir.clone()),
            title: title.unwrap_or_else(|| project_name.clone()),
            subtitle: subtitle.unwrap_or_default(),
            description: string_setting(settings, "description")?.unwrap_or_default(),
            author: string_setting(settings, "author")?.unwrap_or_default(),
            keywords: string_setting(settings, "keywords")?.unwrap_or_default(),
            pages: flatten_pages(pages)?,
            root_dir,
            project_name,
        })
    }

    /// Replaces the page registry with `pages`, flattened.
    pub fn with_pages(mut self, pages: Vec<SiteNode>) -> Result<Self, PageError> {
        self.pages = flatten_pages(pages)?;
        Ok(self)
    }

    /// Top-level pages only, the entries of the primary navigation.
    pub fn top_level_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter_map(SiteNode::as_page)
    }

    pub fn find_page(&self, file_name: &str) -> Option<&SiteNode> {
        self.pages.iter().find(|page| page.file_name() == file_name)
    }
}

/// Appends every page's sub pages right after it. The registry entries are
/// copies; the page keeps its own list for the content menu.
fn flatten_pages(pages: Vec<SiteNode>) -> Result<Vec<SiteNode>, PageError> {
    let mut registry = Vec::with_capacity(pages.len());

    for node in pages {
        match node {
            SiteNode::Page(page) => {
                let sub_pages = page.sub_pages().to_vec();
                registry.push(SiteNode::Page(page));
                registry.extend(sub_pages.into_iter().map(SiteNode::SubPage));
            }
            SiteNode::SubPage(sub_page) => {
                return Err(PageError::OrphanSubPage(sub_page.file_name().to_string()))
            }
            unlinked @ SiteNode::Unlinked(_) => registry.push(unlinked),
        }
    }

    {
        let mut seen = HashSet::new();
        if let Some(duplicate) = registry.iter().find(|node| !seen.insert(node.file_name())) {
            return Err(PageError::DuplicateFileName(duplicate.file_name().to_string()));
        }
    }

    Ok(registry)
}

fn invalid(key: &str, expected: &'static str) -> SettingsError {
    SettingsError::InvalidSetting {
        key: key.to_string(),
        expected,
    }
}

fn string_setting(settings: &Table, key: &str) -> Result<Option<String>, SettingsError> {
    settings
        .get(key)
        .map(|value| {
            value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(key, "a string"))
        })
        .transpose()
}

fn path_setting(settings: &Table, key: &str) -> Result<Option<PathBuf>, SettingsError> {
    Ok(string_setting(settings, key)?.map(PathBuf::from))
}

fn bool_setting(settings: &Table, key: &str) -> Result<Option<bool>, SettingsError> {
    settings
        .get(key)
        .map(|value| value.as_bool().ok_or_else(|| invalid(key, "a boolean")))
        .transpose()
}

fn string_list(value: &Value, key: &str) -> Result<Vec<String>, SettingsError> {
    let items = value
        .as_array()
        .ok_or_else(|| invalid(key, "a list of strings"))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(key, "a list of strings"))
        })
        .collect()
}

fn markdown_extensions(settings: &Table) -> Result<Vec<String>, SettingsError> {
    const KEY: &str = "markdown_extensions";

    match settings.get(KEY) {
        None => Ok(vec![]),
        // older projects wrote '' for "no extensions"
        Some(Value::String(name)) if name.is_empty() => Ok(vec![]),
        Some(Value::String(name)) => Ok(vec![name.clone()]),
        Some(value) => string_list(value, KEY),
    }
}

fn parse_pages(value: &Value) -> Result<Vec<SiteNode>, SettingsError> {
    value
        .as_array()
        .ok_or_else(|| invalid("pages", "a list of page tables"))?
        .iter()
        .map(|entry| parse_node(entry, "page"))
        .collect()
}

fn parse_node(value: &Value, default_kind: &str) -> Result<SiteNode, SettingsError> {
    let entry = value
        .as_table()
        .ok_or_else(|| invalid("pages", "a list of page tables"))?;

    let title = string_setting(entry, "title")?.ok_or_else(|| invalid("pages", "titled pages"))?;
    let file_name = string_setting(entry, "file_name")?
        .ok_or_else(|| invalid("pages", "pages with a file_name"))?;
    let kind = string_setting(entry, "kind")?.unwrap_or_else(|| default_kind.to_string());

    match kind.as_str() {
        "page" => {
            let children = match entry.get("sub_pages") {
                Some(sub_pages) => sub_pages
                    .as_array()
                    .ok_or_else(|| invalid("sub_pages", "a list of page tables"))?
                    .iter()
                    .map(|child| parse_node(child, "sub_page"))
                    .collect::<Result<Vec<_>, _>>()?,
                None => vec![],
            };
            Ok(Page::with_children(title, file_name, children)?.into())
        }
        "sub_page" => Ok(SubPage::new(title, file_name).into()),
        "unlinked" => {
            let path = match entry.get("path") {
                None => vec![],
                Some(Value::String(path)) => path.as_str().into_segments(),
                Some(path) => string_list(path, "path")?,
            };
            Ok(UnlinkedPage::new(title, file_name, path).into())
        }
        _ => Err(invalid("kind", "one of page, sub_page or unlinked")),
    }
}
