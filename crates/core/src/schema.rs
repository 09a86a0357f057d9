//! The memo field schema and the typed record validation produces.

use chrono::NaiveDate;
use memo_template::PlaceholderMap;
use serde::Deserialize;
use std::collections::HashMap;

/// Raw, untrusted form fields as submitted by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FieldSet {
    fields: HashMap<String, String>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field. A repeated key keeps the last value, as form
    /// decoders usually do.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Calendar date written as `YYYY-MM-DD`.
    Date,
}

/// One entry of the field schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Key the browser form posts.
    pub key: &'static str,
    /// Placeholder name templates use.
    pub placeholder: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

const fn field(key: &'static str, placeholder: &'static str, required: bool, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        key,
        placeholder,
        required,
        kind,
    }
}

pub const TITLE: FieldSpec = field("title", "TITLE", true, FieldKind::Text);
pub const CLIENT_NAME: FieldSpec = field("clientName", "CLIENT_NAME", true, FieldKind::Text);
pub const PREPARED_BY: FieldSpec = field("preparedBy", "PREPARED_BY", true, FieldKind::Text);
pub const MEMO_DATE: FieldSpec = field("memoDate", "MEMO_DATE", true, FieldKind::Date);
pub const SUBTITLE: FieldSpec = field("subtitle", "SUBTITLE", false, FieldKind::Text);
pub const SUMMARY: FieldSpec = field("summary", "SUMMARY", false, FieldKind::Text);
pub const BODY: FieldSpec = field("body", "BODY", false, FieldKind::Text);
pub const FOOTER_LABEL: FieldSpec = field("footerLabel", "FOOTER_LABEL", false, FieldKind::Text);
pub const FOOTER_VALUE: FieldSpec = field("footerValue", "FOOTER_VALUE", false, FieldKind::Text);

/// Every field the memo understands, in the order issues are reported.
/// Keys not listed here are ignored.
pub const MEMO_FIELDS: [FieldSpec; 9] = [
    TITLE,
    CLIENT_NAME,
    PREPARED_BY,
    MEMO_DATE,
    SUBTITLE,
    SUMMARY,
    BODY,
    FOOTER_LABEL,
    FOOTER_VALUE,
];

/// Placeholder for the memo date written out in words.
pub const MEMO_DATE_LONG: &str = "MEMO_DATE_LONG";
/// Placeholder for the composed footer line.
pub const FOOTER_LINE: &str = "FOOTER_LINE";

/// Longest accepted text value, in characters.
pub const MAX_TEXT_LEN: usize = 10_000;

/// Validated memo fields. Derived values such as the footer line are
/// computed from the fields on each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoData {
    pub title: String,
    pub client_name: String,
    pub prepared_by: String,
    pub memo_date: NaiveDate,
    pub subtitle: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub footer_label: Option<String>,
    pub footer_value: Option<String>,
}

impl MemoData {
    pub fn new(
        title: String,
        client_name: String,
        prepared_by: String,
        memo_date: NaiveDate,
    ) -> Self {
        Self {
            title,
            client_name,
            prepared_by,
            memo_date,
            subtitle: None,
            summary: None,
            body: None,
            footer_label: None,
            footer_value: None,
        }
    }

    pub fn with_footer(mut self, label: Option<String>, value: Option<String>) -> Self {
        self.footer_label = label;
        self.footer_value = value;
        self
    }

    /// `"<label>: <value>"`, or whichever half is present, or empty.
    pub fn footer_line(&self) -> String {
        compose_footer_line(self.footer_label.as_deref(), self.footer_value.as_deref())
    }

    /// The memo date written out, e.g. `19 October 2026`.
    pub fn memo_date_long(&self) -> String {
        self.memo_date.format("%-d %B %Y").to_string()
    }

    /// Every data placeholder; absent optional fields map to empty strings.
    pub fn placeholders(&self) -> PlaceholderMap {
        let optional = |value: &Option<String>| value.clone().unwrap_or_default();
        PlaceholderMap::new()
            .with(TITLE.placeholder, self.title.as_str())
            .with(CLIENT_NAME.placeholder, self.client_name.as_str())
            .with(PREPARED_BY.placeholder, self.prepared_by.as_str())
            .with(MEMO_DATE.placeholder, self.memo_date.format("%Y-%m-%d").to_string())
            .with(SUBTITLE.placeholder, optional(&self.subtitle))
            .with(SUMMARY.placeholder, optional(&self.summary))
            .with(BODY.placeholder, optional(&self.body))
            .with(FOOTER_LABEL.placeholder, optional(&self.footer_label))
            .with(FOOTER_VALUE.placeholder, optional(&self.footer_value))
            .with(MEMO_DATE_LONG, self.memo_date_long())
            .with(FOOTER_LINE, self.footer_line())
    }
}

/// Every placeholder name `MemoData::placeholders` fills in.
pub fn data_placeholder_names() -> impl Iterator<Item = &'static str> {
    MEMO_FIELDS
        .into_iter()
        .map(|spec| spec.placeholder)
        .chain([MEMO_DATE_LONG, FOOTER_LINE])
}

pub(crate) fn compose_footer_line(label: Option<&str>, value: Option<&str>) -> String {
    match (label, value) {
        (Some(label), Some(value)) => format!("{label}: {value}"),
        (Some(only), None) | (None, Some(only)) => only.to_string(),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoData {
        MemoData::new(
            "Q3 Liquidity Review".into(),
            "Northwind Capital".into(),
            "A. Analyst".into(),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        )
    }

    #[test]
    fn test_footer_line_composition() {
        assert_eq!(compose_footer_line(Some("Ref"), Some("NW-204")), "Ref: NW-204");
        assert_eq!(compose_footer_line(Some("Confidential"), None), "Confidential");
        assert_eq!(compose_footer_line(None, Some("NW-204")), "NW-204");
        assert_eq!(compose_footer_line(None, None), "");
    }

    #[test]
    fn test_with_footer_recomputes_line() {
        let data = sample().with_footer(Some("Ref".into()), Some("NW-204".into()));
        assert_eq!(data.footer_line(), "Ref: NW-204");
        assert_eq!(sample().footer_line(), "");
    }

    #[test]
    fn test_footer_line_follows_later_field_edits() {
        let mut data = sample().with_footer(Some("Ref".into()), Some("NW-204".into()));
        data.footer_value = Some("NW-205".into());
        assert_eq!(data.placeholders().get(FOOTER_LINE), Some("Ref: NW-205"));

        data.footer_label = None;
        assert_eq!(data.footer_line(), "NW-205");
        assert_eq!(data.placeholders().get(FOOTER_LINE), Some("NW-205"));
    }

    #[test]
    fn test_placeholders_cover_schema_and_derived_fields() {
        let map = sample().placeholders();
        for spec in MEMO_FIELDS {
            assert!(map.contains(spec.placeholder), "missing {}", spec.placeholder);
        }
        assert_eq!(map.get("MEMO_DATE"), Some("2026-10-19"));
        assert_eq!(map.get(MEMO_DATE_LONG), Some("19 October 2026"));
        assert_eq!(map.get("SUBTITLE"), Some(""));
        assert_eq!(map.get(FOOTER_LINE), Some(""));
    }

    #[test]
    fn test_schema_placeholders_are_valid_names() {
        for name in data_placeholder_names() {
            assert!(memo_template::is_placeholder_name(name));
        }
    }

    #[test]
    fn test_placeholder_names_match_rendered_map() {
        let map = sample().placeholders();
        let mut names: Vec<&str> = data_placeholder_names().collect();
        names.sort_unstable();
        assert_eq!(map.names().collect::<Vec<_>>(), names);
    }

    #[test]
    fn test_field_set_from_json() {
        let fields: FieldSet =
            serde_json::from_str(r#"{"title": "Memo", "clientName": "Acme"}"#).unwrap();
        assert_eq!(fields.get("title"), Some("Memo"));
        assert_eq!(fields.len(), 2);
    }
}
