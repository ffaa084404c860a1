use std::{collections::HashMap, sync::Arc};

use crate::markdown::MarkdownConverter;

/// `{{ text | markdown }}`, converted with the site's extensions.
pub struct Markdown {
    converter: Arc<MarkdownConverter>,
}

impl Markdown {
    pub fn new(converter: Arc<MarkdownConverter>) -> Self {
        Markdown { converter }
    }
}

impl tera::Filter for Markdown {
    fn filter(
        &self,
        value: &tera::Value,
        _args: &HashMap<String, tera::Value>,
    ) -> tera::Result<tera::Value> {
        let input = tera::from_value::<String>(value.clone())?;

        let contents = self
            .converter
            .convert(&input)
            .map_err(|e| tera::Error::msg(format!("markdown filter failed: {}", e)))?;

        Ok(tera::to_value(contents)?)
    }

    fn is_safe(&self) -> bool {
        true
    }
}
