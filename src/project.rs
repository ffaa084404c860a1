//! Project files on disk: loading `settings.toml`, scaffolding new projects
//! and exporting the bundled templates.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use toml::{Table, Value};

use crate::{
    error::{Error, SettingsError},
    settings::SiteSettings,
    template::BUNDLED_TEMPLATES,
};

pub const SETTINGS_FILE: &str = "settings.toml";

/// Settings holding paths, resolved against the settings file's directory.
const PATH_SETTINGS: &[&str] = &[
    "root_dir",
    "templates_dir",
    "static_dir",
    "markdown_dir",
    "site_dir",
];

/// Reads a settings file into the map [`SiteSettings::from_map`] expects.
pub fn load_settings(path: &Path) -> Result<Table, Error> {
    let mut settings = read_table(path)?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for key in PATH_SETTINGS {
        if let Some(Value::String(dir)) = settings.get_mut(*key) {
            *dir = base.join(dir.as_str()).to_string_lossy().to_string();
        }
    }

    Ok(settings)
}

fn read_table(path: &Path) -> Result<Table, Error> {
    let text = fs::read_to_string(path)?;
    let table = toml::from_str(&text).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(table)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Style {
    #[default]
    Basic,
    Soprano,
}

impl Style {
    pub const ALL: [Style; 2] = [Style::Basic, Style::Soprano];

    pub fn name(&self) -> &'static str {
        match self {
            Style::Basic => "basic",
            Style::Soprano => "soprano",
        }
    }

    pub fn stylesheet(&self) -> &'static str {
        match self {
            Style::Basic => include_str!("../styles/basic.css"),
            Style::Soprano => include_str!("../styles/soprano.css"),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Style::ALL
            .into_iter()
            .find(|style| style.name() == name)
            .ok_or_else(|| Error::UnknownStyle(name.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    pub project_name: String,
    /// Derived from the project name when missing.
    pub site_title: Option<String>,
    pub author: Option<String>,
    pub style: Style,
}

impl ProjectOptions {
    pub fn site_title(&self) -> String {
        self.site_title.clone().unwrap_or_else(|| {
            let title = self.project_name.replace(['-', '_'], " ");
            let mut chars = title.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => title,
            }
        })
    }
}

/// Creates `{parent}/{project_name}` with settings, a first markdown page
/// and the chosen style's stylesheet. Fails if the directory exists.
pub fn create_project(parent: &Path, options: &ProjectOptions) -> Result<PathBuf, Error> {
    let name = &options.project_name;
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(Error::InvalidProjectName(name.clone()));
    }

    let root = parent.join(name);
    fs::create_dir(&root)?;

    let mut home = Table::new();
    home.insert("title".into(), "Home".into());
    home.insert("file_name".into(), "index".into());

    let mut settings = Table::new();
    settings.insert("debug".into(), true.into());
    settings.insert("project_name".into(), name.as_str().into());
    settings.insert("site_title".into(), options.site_title().into());
    settings.insert(
        "author".into(),
        options.author.clone().unwrap_or_default().into(),
    );
    settings.insert("root_dir".into(), ".".into());
    settings.insert("pages".into(), Value::Array(vec![Value::Table(home)]));
    fs::write(root.join(SETTINGS_FILE), toml_text(&settings)?)?;

    fs::create_dir(root.join("md"))?;
    fs::write(
        root.join("md").join("index.md"),
        format!("# Hello, world\nyou have successfully created the zorn project \"{name}\"!\n"),
    )?;

    // main.min.css is normally produced by an asset build step
    fs::write(root.join("main.css"), options.style.stylesheet())?;
    fs::write(root.join("main.min.css"), options.style.stylesheet())?;

    tracing::info!(project = %name, style = %options.style, path = %root.display(), "created project");

    Ok(root)
}

fn toml_text(table: &Table) -> Result<String, Error> {
    Ok(toml::to_string(table).map_err(SettingsError::from)?)
}

/// Writes the bundled templates to `{root_dir}/templates` and, with
/// `update`, points the settings file at them.
pub fn import_templates(settings_path: &Path, update: bool) -> Result<PathBuf, Error> {
    let settings = SiteSettings::from_map(&load_settings(settings_path)?)?;

    let dir = settings.root_dir.join("templates");
    fs::create_dir(&dir)?;
    for (name, contents) in BUNDLED_TEMPLATES {
        fs::write(dir.join(name), contents)?;
    }

    if update {
        // written relative to the settings file, like root_dir itself
        let mut raw = read_table(settings_path)?;
        let root_dir = raw.get("root_dir").and_then(Value::as_str).unwrap_or(".");
        let templates_dir = Path::new(root_dir).join("templates");
        raw.insert(
            "templates_dir".into(),
            templates_dir.to_string_lossy().to_string().into(),
        );
        fs::write(settings_path, toml_text(&raw)?)?;
    }

    tracing::info!(path = %dir.display(), "imported templates");

    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{settings::TemplateSource, site::Website};
    use tempfile::TempDir;

    fn options(name: &str) -> ProjectOptions {
        ProjectOptions {
            project_name: name.into(),
            author: Some("Test Author".into()),
            ..Default::default()
        }
    }

    #[test]
    fn styles_by_name() {
        assert_eq!("soprano".parse::<Style>().unwrap(), Style::Soprano);
        assert_eq!("basic".parse::<Style>().unwrap(), Style::Basic);
        let error = "baroque".parse::<Style>().unwrap_err();
        assert!(matches!(error, Error::UnknownStyle(name) if name == "baroque"));
    }

    #[test]
    fn site_title_from_project_name() {
        assert_eq!(options("my-new_site").site_title(), "My new site");
        let titled = ProjectOptions {
            site_title: Some("Given".into()),
            ..options("x")
        };
        assert_eq!(titled.site_title(), "Given");
    }

    #[test]
    fn relative_paths_follow_the_settings_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(
            &path,
            "root_dir = \".\"\nproject_name = \"p\"\nmarkdown_dir = \"content\"\nsite_dir = \"/srv/www\"\n",
        )
        .unwrap();

        let settings = SiteSettings::from_map(&load_settings(&path).unwrap()).unwrap();
        assert_eq!(settings.root_dir, dir.path().join("."));
        assert_eq!(settings.markdown_dir, dir.path().join("content"));
        assert_eq!(settings.site_dir, PathBuf::from("/srv/www"));
    }

    #[test]
    fn broken_settings_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "root_dir = ").unwrap();
        assert!(matches!(
            load_settings(&path),
            Err(Error::Settings(SettingsError::Parse { .. }))
        ));
    }

    #[test]
    fn invalid_project_names() {
        let dir = TempDir::new().unwrap();
        for name in ["", "my site"] {
            assert!(matches!(
                create_project(dir.path(), &options(name)),
                Err(Error::InvalidProjectName(_))
            ));
        }
    }

    #[test]
    fn create_then_generate() {
        let dir = TempDir::new().unwrap();
        let root = create_project(dir.path(), &options("blog")).unwrap();
        assert!(root.join("main.css").is_file());

        // a second create on the same name fails
        assert!(matches!(
            create_project(dir.path(), &options("blog")),
            Err(Error::Io(_))
        ));

        let settings = load_settings(&root.join(SETTINGS_FILE)).unwrap();
        let mut website = Website::new(&settings).unwrap();
        assert!(website.settings().debug);
        assert_eq!(website.settings().title, "Blog");

        let written = website.generate_pages().unwrap();
        assert_eq!(written.len(), 1);
        let html = fs::read_to_string(&written[0]).unwrap();
        assert!(html.contains("<h1>Hello, world</h1>"));
        assert!(html.contains(r#"href="./main.css""#));
        assert!(html.contains("Test Author"));
    }

    #[test]
    fn import_templates_and_update_settings() {
        let dir = TempDir::new().unwrap();
        let root = create_project(dir.path(), &options("site")).unwrap();
        let settings_path = root.join(SETTINGS_FILE);

        let templates = import_templates(&settings_path, true).unwrap();
        assert!(templates.join("structure.html").is_file());

        let settings = SiteSettings::from_map(&load_settings(&settings_path).unwrap()).unwrap();
        assert_eq!(
            settings.templates,
            TemplateSource::Directory(root.join("templates"))
        );

        // importing twice would overwrite local edits
        assert!(import_templates(&settings_path, false).is_err());
    }

    #[test]
    fn imported_templates_below_a_root_dir() {
        let dir = TempDir::new().unwrap();
        let settings_path = dir.path().join(SETTINGS_FILE);
        fs::create_dir(dir.path().join("site")).unwrap();
        fs::write(&settings_path, "root_dir = \"site\"\nproject_name = \"p\"\n").unwrap();

        let templates = import_templates(&settings_path, true).unwrap();
        assert_eq!(templates, dir.path().join("site").join("templates"));

        let settings = SiteSettings::from_map(&load_settings(&settings_path).unwrap()).unwrap();
        let TemplateSource::Directory(configured) = settings.templates else {
            panic!("expected a template directory");
        };
        assert_eq!(configured, templates);
        assert!(configured.join("structure.html").is_file());
    }
}
