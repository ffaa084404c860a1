use std::{collections::HashMap, sync::Arc};

use crate::{
    error::UnknownPage,
    page::{PageNode, SiteNode},
    settings::UrlStyle,
};

/// `url(name="...")`: the link from the page being rendered to the page
/// with that file name.
pub struct Url {
    pages: Arc<[SiteNode]>,
    from: SiteNode,
    url_style: UrlStyle,
    debug: bool,
}

impl Url {
    pub fn new(pages: Arc<[SiteNode]>, from: SiteNode, url_style: UrlStyle, debug: bool) -> Self {
        Url {
            pages,
            from,
            url_style,
            debug,
        }
    }

    pub fn resolve(&self, file_name: &str) -> Result<String, UnknownPage> {
        self.pages
            .iter()
            .find(|page| page.file_name() == file_name)
            .map(|page| page.relative_path(&self.from, self.url_style, self.debug))
            .ok_or_else(|| UnknownPage(file_name.to_string()))
    }
}

impl tera::Function for Url {
    fn call(&self, args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
        let name = args
            .get("name")
            .cloned()
            .map(tera::from_value::<String>)
            .transpose()?
            .ok_or_else(|| tera::Error::msg("url() takes a `name` argument"))?;

        let path = self
            .resolve(name.trim())
            .map_err(|e| tera::Error::chain(format!("cannot resolve url('{}')", name), e))?;

        Ok(tera::to_value(path)?)
    }

    fn is_safe(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Page, SubPage, UnlinkedPage};
    use tera::Function;

    fn pages() -> Arc<[SiteNode]> {
        let sub_page = SubPage::new("CLI", "cli");
        sub_page.link_parent("doc");
        let pages: Vec<SiteNode> = vec![
            Page::new("Home", "index").into(),
            Page::new("Docs", "doc").into(),
            sub_page.into(),
            UnlinkedPage::new("Imprint", "imprint", "legal").into(),
        ];
        pages.into()
    }

    fn args(name: &str) -> HashMap<String, tera::Value> {
        HashMap::from([("name".to_string(), tera::Value::from(name))])
    }

    #[test]
    fn production_links() {
        let pages = pages();
        let url = Url::new(pages.clone(), pages[1].clone(), UrlStyle::Nested, false);
        assert_eq!(url.resolve("index").unwrap(), "/");
        assert_eq!(url.resolve("cli").unwrap(), "/doc/cli");
        assert_eq!(url.call(&args("imprint")).unwrap(), "/legal/imprint");
    }

    #[test]
    fn debug_links_depend_on_the_rendered_page() {
        let pages = pages();
        let url = Url::new(pages.clone(), pages[3].clone(), UrlStyle::Nested, true);
        assert_eq!(url.resolve("index").unwrap(), "../index.html");
        assert_eq!(url.resolve("cli").unwrap(), "../doc/cli.html");

        let url = Url::new(pages.clone(), pages[2].clone(), UrlStyle::Nested, true);
        assert_eq!(url.resolve("doc").unwrap(), "../doc.html");
    }

    #[test]
    fn unknown_pages_fail() {
        let pages = pages();
        let url = Url::new(pages.clone(), pages[0].clone(), UrlStyle::Flat, false);
        assert_eq!(url.resolve("blog").unwrap_err(), UnknownPage("blog".into()));
        assert!(url.call(&args("blog")).is_err());
        assert!(url.call(&HashMap::new()).is_err());
    }
}
