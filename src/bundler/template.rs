//! Typed template rendering.
//!
//! Templates are rendered with Handlebars in strict mode against a
//! `Serialize` context struct. A placeholder that has no matching field in the
//! context is an error, so a misspelled key fails the build instead of leaving
//! a blank in the generated file.

use crate::bundler::error::{Error, Result};
use handlebars::Handlebars;
use serde::Serialize;

/// How substituted values are escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// XML/HTML entity escaping, for property lists.
    Markup,
    /// Values are inserted verbatim. The caller escapes them for the target syntax.
    Verbatim,
}

/// Render `template` with `context`.
pub fn render<T: Serialize>(
    name: &'static str,
    template: &str,
    context: &T,
    escape: Escape,
) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    if escape == Escape::Verbatim {
        handlebars.register_escape_fn(handlebars::no_escape);
    }

    handlebars
        .register_template_string(name, template)
        .map_err(|e| Error::Template {
            name,
            reason: format!("failed to register: {e}"),
        })?;

    handlebars.render(name, context).map_err(|e| Error::Template {
        name,
        reason: format!("failed to render: {e}"),
    })
}

/// Escape a value for a single-quoted Python string literal.
pub fn escape_python_str(s: &str) -> String {
    s.replace('\\', r"\\").replace('\'', r"\'")
}
