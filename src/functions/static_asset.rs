use std::{
    collections::HashMap,
    path::{Component, Path, PathBuf},
};

/// `static(path="...")`: a static asset addressed from the page being
/// rendered.
pub struct Static {
    prefix: String,
    asset_dir: PathBuf,
    debug: bool,
}

impl Static {
    /// `path_to_root` is the rendered page's way back to the output root,
    /// only used in debug mode. Debug links reach into `static_dir` when it
    /// lives below `site_dir`, otherwise they point at the output root.
    pub fn new(path_to_root: String, static_dir: PathBuf, site_dir: &Path, debug: bool) -> Self {
        if !debug {
            return Static {
                prefix: "/".to_string(),
                asset_dir: static_dir,
                debug,
            };
        }

        let (prefix, asset_dir) = match static_dir.strip_prefix(site_dir) {
            Ok(relative) => {
                let mut prefix = path_to_root;
                for component in relative.components() {
                    if let Component::Normal(segment) = component {
                        prefix.push_str(&segment.to_string_lossy());
                        prefix.push('/');
                    }
                }
                (prefix, static_dir.clone())
            }
            Err(_) => (path_to_root, site_dir.to_path_buf()),
        };

        Static {
            prefix,
            asset_dir,
            debug,
        }
    }

    pub fn resolve(&self, path: &str) -> String {
        let path = path.trim().trim_start_matches('/');

        if self.debug && !self.asset_dir.join(path).exists() {
            tracing::warn!(
                asset = path,
                dir = %self.asset_dir.display(),
                "static asset not found"
            );
        }

        format!("{}{}", self.prefix, path)
    }
}

impl tera::Function for Static {
    fn call(&self, args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
        let path = args
            .get("path")
            .cloned()
            .map(tera::from_value::<String>)
            .transpose()?
            .ok_or_else(|| tera::Error::msg("static() takes a `path` argument"))?;

        Ok(tera::to_value(self.resolve(&path))?)
    }

    fn is_safe(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use tempfile::TempDir;

    #[test]
    fn production_assets_live_at_the_root() {
        let assets = Static::new("../../".into(), PathBuf::from("root/static"), Path::new("root"), false);
        assert_eq!(assets.resolve("something.html"), "/something.html");
        assert_eq!(assets.resolve("/img/logo.png"), "/img/logo.png");
    }

    #[test]
    fn debug_assets_are_relative() {
        let assets = Static::new("../../".into(), PathBuf::from("root/static"), Path::new("root"), true);
        assert_eq!(assets.resolve("img/logo.png"), "../../static/img/logo.png");

        let assets = Static::new("./".into(), PathBuf::from("root/static"), Path::new("root"), true);
        assert_eq!(assets.resolve("main.js"), "./static/main.js");

        // a static dir outside the output tree cannot be reached
        let assets = Static::new("./".into(), PathBuf::from("assets"), Path::new("root"), true);
        assert_eq!(assets.resolve("main.js"), "./main.js");
    }

    #[test]
    fn debug_links_reach_the_asset_from_the_page() {
        let dir = TempDir::new().unwrap();
        let site_dir = dir.path().join(".");
        let static_dir = dir.path().join("static");
        fs::create_dir_all(&static_dir).unwrap();
        fs::write(static_dir.join("logo.png"), "png").unwrap();

        let page_dir = dir.path().join("docs");
        fs::create_dir_all(&page_dir).unwrap();
        let link = Static::new("../".into(), static_dir, &site_dir, true).resolve("logo.png");
        assert_eq!(link, "../static/logo.png");
        assert!(page_dir.join(&link).is_file());
    }
}
