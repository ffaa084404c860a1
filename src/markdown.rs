use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Tag};
use thiserror::Error;

use crate::highlighter::Highlighter;

#[derive(Debug, Error)]
pub enum MarkdownError {
    #[error("unknown markdown extension '{0}'")]
    UnknownExtension(String),
    #[error("failed to highlight code block: {0}")]
    Highlight(#[from] syntect::Error),
}

/// Markdown to html conversion with a configurable set of extensions.
pub struct MarkdownConverter {
    options: Options,
    highlighter: Option<Highlighter>,
}

impl MarkdownConverter {
    /// Accepts both the short extension names and their Python-Markdown
    /// spelling, so existing project settings keep working.
    pub fn new(extensions: &[String]) -> Result<Self, MarkdownError> {
        let mut options = Options::empty();
        let mut highlight = false;

        for extension in extensions {
            match extension.as_str() {
                "tables" => options.insert(Options::ENABLE_TABLES),
                "footnotes" => options.insert(Options::ENABLE_FOOTNOTES),
                "strikethrough" | "del" => options.insert(Options::ENABLE_STRIKETHROUGH),
                "tasklists" => options.insert(Options::ENABLE_TASKLISTS),
                "smart_punctuation" | "smarty" => options.insert(Options::ENABLE_SMART_PUNCTUATION),
                "heading_attributes" | "attr_list" => {
                    options.insert(Options::ENABLE_HEADING_ATTRIBUTES)
                }
                "extra" => options.insert(
                    Options::ENABLE_TABLES
                        | Options::ENABLE_FOOTNOTES
                        | Options::ENABLE_HEADING_ATTRIBUTES,
                ),
                "codehilite" => highlight = true,
                // fenced code blocks are part of CommonMark
                "fenced_code" => {}
                other => return Err(MarkdownError::UnknownExtension(other.to_string())),
            }
        }

        Ok(Self {
            options,
            highlighter: highlight.then(Highlighter::new),
        })
    }

    pub fn convert(&self, input: &str) -> Result<String, MarkdownError> {
        let parser = pulldown_cmark::Parser::new_ext(input, self.options);

        let mut contents = String::new();

        let Some(highlighter) = &self.highlighter else {
            html::push_html(&mut contents, parser);
            return Ok(contents);
        };

        let mut events = vec![];

        let mut in_code_block = false;
        let mut lang = String::new();
        let mut code = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    lang = if let CodeBlockKind::Fenced(name) = kind {
                        name.to_string()
                    } else {
                        "".to_string()
                    };
                }
                Event::Text(t) if in_code_block => {
                    code.push_str(&t);
                }
                Event::End(Tag::CodeBlock(_)) if in_code_block => {
                    let result = highlighter.highlight(&lang, &code)?;

                    events.push(Event::Html(CowStr::from(result)));

                    in_code_block = false;
                    code = String::new();
                }
                _ => events.push(event),
            }
        }

        html::push_html(&mut contents, events.into_iter());

        Ok(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_conversion() {
        let converter = MarkdownConverter::new(&[]).unwrap();
        assert_eq!(
            converter
                .convert("# This is a test\nThere is nothing to see here")
                .unwrap(),
            "<h1>This is a test</h1>\n<p>There is nothing to see here</p>\n"
        );
    }

    #[test]
    fn tables_need_the_extension() {
        let table = "| a | b |\n|---|---|\n| 1 | 2 |\n";

        let plain = MarkdownConverter::new(&[]).unwrap();
        assert!(!plain.convert(table).unwrap().contains("<table>"));

        let tables = MarkdownConverter::new(&["tables".to_string()]).unwrap();
        assert!(tables.convert(table).unwrap().contains("<table>"));
    }

    #[test]
    fn unknown_extension() {
        let error = MarkdownConverter::new(&["toc".to_string()]).err().unwrap();
        assert!(matches!(error, MarkdownError::UnknownExtension(name) if name == "toc"));
    }

    #[test]
    fn code_blocks_are_highlighted() {
        let converter = MarkdownConverter::new(&["codehilite".to_string()]).unwrap();
        let html = converter
            .convert("before\n\n```rust\nlet x = 1;\n```\n")
            .unwrap();
        assert!(html.contains("<p>before</p>"));
        assert!(html.contains("<pre style="));
        assert!(!html.contains("<code"));
    }
}
