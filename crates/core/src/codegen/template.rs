//! Placeholder substitution for prompt templates.
//!
//! Placeholders use `{{name}}`. Single braces are literal text, which keeps JSON
//! examples inside templates readable. Substituted values are never scanned
//! again, so a value may itself contain `{{`.

use std::collections::HashMap;

/// Errors produced while rendering a template.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("missing value for placeholder '{name}' at position {position}")]
    MissingValue { name: String, position: usize },

    #[error("unterminated placeholder at position {position}")]
    Unterminated { position: usize },

    #[error("empty placeholder at position {position}")]
    EmptyPlaceholder { position: usize },
}

/// A value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    Text(String),
    /// Rendered one `- item` per line.
    List(Vec<String>),
}

impl TemplateValue {
    fn render(&self) -> String {
        match self {
            TemplateValue::Text(text) => text.clone(),
            TemplateValue::List(items) if items.is_empty() => "(none)".to_string(),
            TemplateValue::List(items) => items
                .iter()
                .map(|item| format!("- {item}"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl From<&str> for TemplateValue {
    fn from(value: &str) -> Self {
        TemplateValue::Text(value.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(value: String) -> Self {
        TemplateValue::Text(value)
    }
}

impl From<&[String]> for TemplateValue {
    fn from(value: &[String]) -> Self {
        TemplateValue::List(value.to_vec())
    }
}

impl From<Vec<String>> for TemplateValue {
    fn from(value: Vec<String>) -> Self {
        TemplateValue::List(value)
    }
}

/// Named values used to fill a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    values: HashMap<String, TemplateValue>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, replacing any previous binding.
    pub fn with(mut self, name: &str, value: impl Into<TemplateValue>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&TemplateValue> {
        self.values.get(name)
    }
}

/// Substitute every `{{name}}` in `template` with its bound value.
///
/// Fails on the first placeholder that has no value, is empty, or is never
/// closed.
pub fn render(template: &str, vars: &TemplateVars) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);

        let position = offset + start;
        let after_open = &rest[start + 2..];
        let end = after_open
            .find("}}")
            .ok_or(TemplateError::Unterminated { position })?;

        let name = after_open[..end].trim();
        if name.is_empty() {
            return Err(TemplateError::EmptyPlaceholder { position });
        }

        let value = vars.get(name).ok_or_else(|| TemplateError::MissingValue {
            name: name.to_string(),
            position,
        })?;
        output.push_str(&value.render());

        let consumed = start + 2 + end + 2;
        rest = &rest[consumed..];
        offset += consumed;
    }

    output.push_str(rest);

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text_placeholder() {
        let vars = TemplateVars::new().with("prompt", "hello world in python");
        assert_eq!(
            render("Task: {{prompt}}.", &vars).unwrap(),
            "Task: hello world in python."
        );
    }

    #[test]
    fn test_render_allows_whitespace_in_placeholder() {
        let vars = TemplateVars::new().with("name", "genie");
        assert_eq!(render("{{ name }}!", &vars).unwrap(), "genie!");
    }

    #[test]
    fn test_render_list_placeholder() {
        let vars = TemplateVars::new().with(
            "file_paths",
            vec!["main.py".to_string(), "utils.py".to_string()],
        );
        assert_eq!(
            render("Files:\n{{file_paths}}", &vars).unwrap(),
            "Files:\n- main.py\n- utils.py"
        );
    }

    #[test]
    fn test_render_empty_list() {
        let vars = TemplateVars::new().with("file_paths", Vec::<String>::new());
        assert_eq!(render("{{file_paths}}", &vars).unwrap(), "(none)");
    }

    #[test]
    fn test_single_braces_are_literal() {
        let vars = TemplateVars::new();
        let template = r#"Respond with {"file_paths": ["a"]}"#;
        assert_eq!(render(template, &vars).unwrap(), template);
    }

    #[test]
    fn test_missing_value_is_an_error() {
        let vars = TemplateVars::new().with("prompt", "x");
        assert_eq!(
            render("{{prompt}} {{filename}}", &vars),
            Err(TemplateError::MissingValue {
                name: "filename".to_string(),
                position: 11,
            })
        );
    }

    #[test]
    fn test_unterminated_placeholder() {
        let vars = TemplateVars::new().with("prompt", "x");
        assert_eq!(
            render("abc {{prompt", &vars),
            Err(TemplateError::Unterminated { position: 4 })
        );
    }

    #[test]
    fn test_empty_placeholder() {
        let vars = TemplateVars::new();
        assert_eq!(
            render("{{  }}", &vars),
            Err(TemplateError::EmptyPlaceholder { position: 0 })
        );
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let vars = TemplateVars::new()
            .with("a", "{{b}}")
            .with("b", "should not appear");
        assert_eq!(render("{{a}}", &vars).unwrap(), "{{b}}");
    }

    #[test]
    fn test_multibyte_text_around_placeholders() {
        let vars = TemplateVars::new().with("x", "ü");
        assert_eq!(render("• {{x}} •", &vars).unwrap(), "• ü •");
    }
}
