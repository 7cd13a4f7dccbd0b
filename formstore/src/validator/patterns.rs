//! Named regular expressions and string checks for writing validators.

use std::collections::HashMap;

use regex::Regex;

use crate::value::Value;

const DEFAULT_PATTERNS: &[(&str, &str)] = &[
    (
        "email",
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    ),
    ("a_number", r"[0-9]"),
    ("a_non_number", r"[^0-9]"),
    ("an_uppercase_letter", r"[A-Z]"),
    ("a_lowercase_letter", r"[a-z]"),
    ("a_space", r"\s"),
];

/// Table of named regexes with the usual string checks on top.
///
/// # Example
///
/// ```
/// use formstore::Value;
/// use formstore::validator::TextPatterns;
///
/// let patterns = TextPatterns::new().with_pattern("postcode", r"^\d{4}$").unwrap();
/// assert!(patterns.string_matches(&Value::from("3000"), "postcode"));
/// assert!(patterns.string_doesnt_match(&Value::from("password"), "a_number"));
/// ```
#[derive(Debug, Clone)]
pub struct TextPatterns {
    regexes: HashMap<String, Regex>,
}

impl TextPatterns {
    /// Create a table holding the default patterns.
    pub fn new() -> Self {
        let regexes = DEFAULT_PATTERNS
            .iter()
            .filter_map(|(name, pattern)| match Regex::new(pattern) {
                Ok(regex) => Some((name.to_string(), regex)),
                Err(e) => {
                    log::error!("Default pattern '{}' failed to compile: {}", name, e);
                    None
                }
            })
            .collect();
        Self { regexes }
    }

    /// Add or replace a named pattern.
    pub fn with_pattern(mut self, name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        self.regexes.insert(name.into(), Regex::new(pattern)?);
        Ok(self)
    }

    /// Look up a pattern.
    pub fn get(&self, name: &str) -> Option<&Regex> {
        self.regexes.get(name)
    }

    /// Check if the value is text.
    pub fn is_string(&self, value: &Value) -> bool {
        value.as_text().is_some()
    }

    /// Check that the value is not an empty string.
    ///
    /// Non-text values count as typed.
    pub fn is_typed_string(&self, value: &Value) -> bool {
        !value.is_empty_text()
    }

    /// Check that the value is non-empty text matching the named pattern.
    pub fn string_matches(&self, value: &Value, name: &str) -> bool {
        self.test(value, name).unwrap_or(false)
    }

    /// Check that the value is non-empty text not matching the named pattern.
    ///
    /// Empty text never "doesn't match"; pair with `required` to reject it.
    pub fn string_doesnt_match(&self, value: &Value, name: &str) -> bool {
        self.test(value, name).is_some_and(|matched| !matched)
    }

    fn test(&self, value: &Value, name: &str) -> Option<bool> {
        let text = value.as_text().filter(|text| !text.is_empty())?;
        let Some(regex) = self.regexes.get(name) else {
            log::warn!("Unknown text pattern '{}'", name);
            return None;
        };
        Some(regex.is_match(text))
    }
}

impl Default for TextPatterns {
    fn default() -> Self {
        Self::new()
    }
}
