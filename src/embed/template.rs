//! Template types for typed variable injection.

use std::{borrow::Cow, marker::PhantomData};

/// Trait for template variable sets
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection.
///
/// Content is either embedded at compile time or loaded from a user file.
#[derive(Debug, Clone)]
pub struct Template<V> {
    content: Cow<'static, str>,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content: Cow::Borrowed(content),
            _marker: PhantomData,
        }
    }

    pub fn from_string(content: String) -> Self {
        Self {
            content: Cow::Owned(content),
            _marker: PhantomData,
        }
    }

    #[cfg(test)]
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(&self.content)
    }
}

/// Escape HTML special characters in text content.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    const SPECIAL: [char; 5] = ['<', '>', '&', '"', '\''];
    if !s.contains(SPECIAL) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}
