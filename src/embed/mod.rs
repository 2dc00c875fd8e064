//! Embedded static resources.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `index` - The index page template (`index.html`) listing published directories
//!
//! # Usage
//!
//! ```ignore
//! use embed::index::{INDEX_HTML, IndexVars};
//!
//! let html = INDEX_HTML.render(&IndexVars { names: &names, title: "Docs" });
//! ```

mod template;

pub use template::{Template, TemplateVars, escape_html};

pub mod index {
    //! Index page template.
    //!
    //! Placeholders:
    //!
    //! | Placeholder        | Value                                         |
    //! |--------------------|-----------------------------------------------|
    //! | `__TITLE__`        | HTML-escaped title                            |
    //! | `__NAMES_JSON__`   | JSON array of directory names                 |
    //! | `__NAME__`         | HTML-escaped name (inside a names block)      |
    //! | `__NAME_HREF__`    | percent-encoded `name/` (inside a names block) |
    //!
    //! A names block spans `<!-- names -->` to `<!-- /names -->` and is
    //! repeated once per name.

    use super::{Template, TemplateVars, escape_html};
    use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

    pub const BLOCK_START: &str = "<!-- names -->";
    pub const BLOCK_END: &str = "<!-- /names -->";

    /// Characters escaped inside a path segment (RFC 3986 `pchar` complement).
    const PATH_SEGMENT: &AsciiSet = &CONTROLS
        .add(b' ')
        .add(b'"')
        .add(b'#')
        .add(b'%')
        .add(b'/')
        .add(b'<')
        .add(b'>')
        .add(b'?')
        .add(b'`')
        .add(b'{')
        .add(b'}');

    /// Variables for the index template.
    #[derive(Debug, Clone, Copy)]
    pub struct IndexVars<'a> {
        pub names: &'a [String],
        pub title: &'a str,
    }

    impl TemplateVars for IndexVars<'_> {
        fn apply(&self, content: &str) -> String {
            let title = escape_html(self.title);
            let names_json =
                serde_json::to_string(self.names).unwrap_or_else(|_| "[]".to_string());
            let scalars = [("__TITLE__", &*title), ("__NAMES_JSON__", names_json.as_str())];
            expand_blocks(content, self.names, &scalars)
        }
    }

    /// Default index template.
    pub const INDEX_HTML: Template<IndexVars<'static>> =
        Template::new(include_str!("index.html"));

    /// Build a template from user content, checking block markers pair up.
    pub fn from_user(content: String) -> Result<Template<IndexVars<'static>>, String> {
        check_blocks(&content)?;
        Ok(Template::from_string(content))
    }

    /// Verify every `BLOCK_START` has a matching `BLOCK_END` and blocks don't nest.
    pub fn check_blocks(content: &str) -> Result<(), String> {
        let mut rest = content;
        loop {
            let start = rest.find(BLOCK_START);
            let end = rest.find(BLOCK_END);
            match (start, end) {
                (None, None) => return Ok(()),
                (None, Some(_)) => return Err(format!("`{BLOCK_END}` without `{BLOCK_START}`")),
                (Some(s), Some(e)) if s < e => {
                    let body = &rest[s + BLOCK_START.len()..e];
                    if body.contains(BLOCK_START) {
                        return Err("nested names blocks are not supported".to_string());
                    }
                    rest = &rest[e + BLOCK_END.len()..];
                }
                (Some(_), Some(_)) => {
                    return Err(format!("`{BLOCK_END}` without `{BLOCK_START}`"));
                }
                (Some(_), None) => return Err(format!("unterminated `{BLOCK_START}` block")),
            }
        }
    }

    /// Repeat every names block once per name, substituting `scalars`
    /// everywhere.
    ///
    /// Assumes `check_blocks` passed; a dangling start marker is left as-is.
    fn expand_blocks(content: &str, names: &[String], scalars: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(s) = rest.find(BLOCK_START) {
            let after_start = &rest[s + BLOCK_START.len()..];
            let Some(e) = after_start.find(BLOCK_END) else {
                break;
            };
            out.push_str(&substitute(&rest[..s], scalars));
            let body = &after_start[..e];
            for name in names {
                out.push_str(&render_item(body, name, scalars));
            }
            rest = &after_start[e + BLOCK_END.len()..];
        }

        out.push_str(&substitute(rest, scalars));
        out
    }

    /// Percent-encode `name` for use as one URL path segment.
    pub fn encode_segment(name: &str) -> String {
        utf8_percent_encode(name, PATH_SEGMENT).to_string()
    }

    fn render_item(body: &str, name: &str, scalars: &[(&str, &str)]) -> String {
        let href = format!("{}/", encode_segment(name));
        let text = escape_html(name);
        let mut vars = vec![("__NAME_HREF__", href.as_str()), ("__NAME__", &*text)];
        vars.extend_from_slice(scalars);
        substitute(body, &vars)
    }

    /// Replace every placeholder in one left-to-right pass; inserted values
    /// are never scanned again.
    fn substitute(text: &str, vars: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some((at, key, value)) = vars
            .iter()
            .filter_map(|&(key, value)| rest.find(key).map(|at| (at, key, value)))
            .min_by_key(|&(at, ..)| at)
        {
            out.push_str(&rest[..at]);
            out.push_str(value);
            rest = &rest[at + key.len()..];
        }

        out.push_str(rest);
        out
    }

}
