//! zorn turns a declared tree of pages plus markdown files into a static
//! html site.
//!
//! The page tree lives in `settings.toml`. [`site::Website`] resolves it,
//! renders every page through the `structure.html` template and writes the
//! result under the site directory, laid out flat or nested.

pub mod context;
pub mod error;
pub mod functions;
pub mod highlighter;
pub mod markdown;
pub mod page;
pub mod project;
pub mod settings;
pub mod site;
pub mod template;

pub use error::{Error, PageError, SettingsError};
pub use page::{Page, PageNode, SiteNode, SubPage, UnlinkedPage};
pub use settings::{SiteSettings, UrlStyle};
pub use site::Website;
