use std::{error::Error as StdError, io, path::PathBuf};

use thiserror::Error;

use crate::{markdown::MarkdownError, page::PageKind};

/// Raised while building the page tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("all children of page '{parent}' have to be sub pages, but '{child}' is a {kind}")]
    NotASubPage {
        parent: String,
        child: String,
        kind: PageKind,
    },
    #[error("sub page '{0}' has to be declared inside a page")]
    OrphanSubPage(String),
    #[error("file name '{0}' is used by more than one page")]
    DuplicateFileName(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{0} has to be set in the settings file")]
    SettingNotFound(&'static str),
    #[error("setting '{key}' must be {expected}")]
    InvalidSetting { key: String, expected: &'static str },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error(transparent)]
    Page(#[from] PageError),
}

/// A `url()` lookup that matched no page in the registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no page found with file name '{0}'")]
pub struct UnknownPage(pub String);

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error("no page found with file name '{0}'")]
    PageNotFound(String),
    #[error("the style '{0}' is not recognized")]
    UnknownStyle(String),
    #[error("'{0}' is not a valid project name")]
    InvalidProjectName(String),
    #[error("page '{0}' has not been rendered")]
    NotRendered(String),
    #[error(transparent)]
    Markdown(#[from] MarkdownError),
    #[error("template error: {0}")]
    Template(#[source] tera::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<tera::Error> for Error {
    fn from(error: tera::Error) -> Self {
        // tera wraps function failures in several layers of context
        let mut source: Option<&(dyn StdError + 'static)> = Some(&error);
        while let Some(current) = source {
            if let Some(UnknownPage(name)) = current.downcast_ref::<UnknownPage>() {
                return Error::PageNotFound(name.clone());
            }
            source = current.source();
        }

        Error::Template(error)
    }
}
