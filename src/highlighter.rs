use syntect::{highlighting::ThemeSet, html::highlighted_html_for_string, parsing::SyntaxSet};

const THEME: &str = "base16-ocean.dark";

/// Syntax highlighting for fenced code blocks.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    pub fn highlight(&self, lang: &str, input: &str) -> Result<String, syntect::Error> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let theme = &self.theme_set.themes[THEME];

        highlighted_html_for_string(input, &self.syntax_set, syntax, theme)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_language_is_coloured() {
        let html = Highlighter::new().highlight("rust", "fn main() {}\n").unwrap();
        assert!(html.starts_with("<pre style="));
        assert!(html.contains("main"));
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text() {
        let html = Highlighter::new().highlight("no-such-lang", "a < b\n").unwrap();
        assert!(html.contains("a &lt; b"));
    }
}
