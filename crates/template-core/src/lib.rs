//! Flat placeholder substitution.
//!
//! Templates are plain text (HTML or SVG here) containing tokens of the form
//! `{{NAME}}`, where `NAME` is an uppercase ASCII letter followed by uppercase
//! letters, digits, or underscores. Anything else between braces is ordinary
//! text.
//!
//! ## Rules
//!
//! - A token whose name is in the [`PlaceholderMap`] is replaced by the mapped
//!   value, inserted as-is. Values are not escaped and are never scanned for
//!   further tokens.
//! - A token whose name is not in the map is copied through unchanged.
//! - Map entries the template never mentions have no effect.
//!
//! There are no loops, conditionals, or partials. Nesting is done by the
//! caller: render a fragment, then pass the result as a value to an outer
//! template.

use memo_traits::SharedTemplate;
use std::collections::BTreeMap;
use std::fmt;

pub const TOKEN_OPEN: &str = "{{";
pub const TOKEN_CLOSE: &str = "}}";

/// Placeholder names mapped to substitution text for one rendering call.
///
/// Names are unique; inserting an existing name replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    values: BTreeMap<String, String>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the one it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(name.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PlaceholderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = PlaceholderMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for PlaceholderMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

/// Returns true if `name` is a valid placeholder name.
pub fn is_placeholder_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    matches!(bytes.next(), Some(b) if b.is_ascii_uppercase()) && bytes.all(is_name_byte)
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_'
}

/// Parses a token at the start of `s` (which begins with `{{`).
/// Returns the name and the token's total byte length.
fn parse_token(s: &str) -> Option<(&str, usize)> {
    let body = &s[TOKEN_OPEN.len()..];
    let name_len = body.bytes().take_while(|&b| is_name_byte(b)).count();
    let name = &body[..name_len];
    if !is_placeholder_name(name) || !body[name_len..].starts_with(TOKEN_CLOSE) {
        return None;
    }
    Some((name, TOKEN_OPEN.len() + name_len + TOKEN_CLOSE.len()))
}

/// A piece of a scanned template.
enum Piece<'t> {
    Text(&'t str),
    Token { name: &'t str, raw: &'t str },
}

/// Visits the template as alternating literal text and tokens.
fn scan<'t>(template: &'t str, mut visit: impl FnMut(Piece<'t>)) {
    let mut rest = template;
    while let Some(start) = rest.find(TOKEN_OPEN) {
        visit(Piece::Text(&rest[..start]));
        let candidate = &rest[start..];
        match parse_token(candidate) {
            Some((name, len)) => {
                visit(Piece::Token {
                    name,
                    raw: &candidate[..len],
                });
                rest = &candidate[len..];
            }
            None => {
                // Not a token; keep one brace and look again from the next byte
                // so `{{{NAME}}}` still finds `{{NAME}}`.
                visit(Piece::Text(&candidate[..1]));
                rest = &candidate[1..];
            }
        }
    }
    visit(Piece::Text(rest));
}

/// Substitutes `placeholders` into `template` in a single pass.
pub fn render(template: &str, placeholders: &PlaceholderMap) -> String {
    let mut out = String::with_capacity(template.len());
    scan(template, |piece| match piece {
        Piece::Text(text) => out.push_str(text),
        Piece::Token { name, raw } => out.push_str(placeholders.get(name).unwrap_or(raw)),
    });
    out
}

/// Distinct placeholder names in `template`, in order of first appearance.
pub fn placeholder_names(template: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    scan(template, |piece| {
        if let Piece::Token { name, .. } = piece
            && !names.contains(&name)
        {
            names.push(name);
        }
    });
    names
}

/// A named template loaded from a template source.
#[derive(Clone)]
pub struct Template {
    name: String,
    text: SharedTemplate,
}

impl Template {
    pub fn new(name: impl Into<String>, text: impl Into<SharedTemplate>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn render(&self, placeholders: &PlaceholderMap) -> String {
        render(&self.text, placeholders)
    }

    pub fn placeholders(&self) -> Vec<&str> {
        placeholder_names(&self.text)
    }

    /// Placeholders referenced by the template that `placeholders` doesn't supply.
    pub fn unresolved<'a>(&'a self, placeholders: &PlaceholderMap) -> Vec<&'a str> {
        self.placeholders()
            .into_iter()
            .filter(|name| !placeholders.contains(name))
            .collect()
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("len", &self.text.len())
            .finish()
    }
}
