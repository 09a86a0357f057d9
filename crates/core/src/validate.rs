//! Field validation: raw `FieldSet` in, typed `MemoData` out.

use crate::error::{FieldIssue, IssueKind, ValidationError};
use crate::schema::{
    BODY, CLIENT_NAME, FOOTER_LABEL, FOOTER_VALUE, FieldKind, FieldSet, FieldSpec, MAX_TEXT_LEN,
    MEMO_DATE, MemoData, PREPARED_BY, SUBTITLE, SUMMARY, TITLE,
};
use chrono::NaiveDate;

/// Trims surrounding whitespace and turns CRLF line endings into LF.
fn normalize(raw: &str) -> String {
    raw.trim().replace("\r\n", "\n")
}

/// Checks one field. `Ok(None)` means an optional field was left out.
fn check_field(spec: &FieldSpec, raw: Option<&str>) -> Result<Option<String>, IssueKind> {
    let value = match raw.map(normalize) {
        None if spec.required => return Err(IssueKind::Missing),
        Some(v) if v.is_empty() && spec.required => return Err(IssueKind::Empty),
        None => return Ok(None),
        Some(v) if v.is_empty() => return Ok(None),
        Some(v) => v,
    };

    match spec.kind {
        FieldKind::Text if value.chars().count() > MAX_TEXT_LEN => Err(IssueKind::Malformed {
            reason: format!("longer than {MAX_TEXT_LEN} characters"),
        }),
        FieldKind::Text => Ok(Some(value)),
        FieldKind::Date => parse_date(&value).map(|_| Some(value)),
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, IssueKind> {
    let malformed = || IssueKind::Malformed {
        reason: "expected a date as YYYY-MM-DD".to_string(),
    };
    // chrono accepts unpadded month and day digits
    if value.len() != 10 {
        return Err(malformed());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| malformed())
}

/// Validates `fields` against the memo schema.
///
/// Every schema field is checked, so the error lists all failing fields at
/// once, in `MEMO_FIELDS` order. Unknown keys are ignored. Nothing is
/// returned on failure.
pub fn validate(fields: &FieldSet) -> Result<MemoData, ValidationError> {
    let mut issues = Vec::new();
    let mut check = |spec: &FieldSpec| match check_field(spec, fields.get(spec.key)) {
        Ok(value) => value,
        Err(kind) => {
            issues.push(FieldIssue {
                field: spec.key,
                kind,
            });
            None
        }
    };

    let title = check(&TITLE);
    let client_name = check(&CLIENT_NAME);
    let prepared_by = check(&PREPARED_BY);
    let memo_date = check(&MEMO_DATE).and_then(|v| parse_date(&v).ok());
    let subtitle = check(&SUBTITLE);
    let summary = check(&SUMMARY);
    let body = check(&BODY);
    let footer_label = check(&FOOTER_LABEL);
    let footer_value = check(&FOOTER_VALUE);

    match (title, client_name, prepared_by, memo_date) {
        (Some(title), Some(client_name), Some(prepared_by), Some(memo_date)) if issues.is_empty() => {
            let mut data = MemoData::new(title, client_name, prepared_by, memo_date)
                .with_footer(footer_label, footer_value);
            data.subtitle = subtitle;
            data.summary = summary;
            data.body = body;
            Ok(data)
        }
        _ => {
            log::debug!("Rejected memo fields: {:?}", issues);
            Err(ValidationError::new(issues))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MEMO_FIELDS;

    fn complete() -> FieldSet {
        [
            ("title", "Q3 Liquidity Review"),
            ("clientName", "Northwind Capital"),
            ("preparedBy", "A. Analyst"),
            ("memoDate", "2026-10-19"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_complete_fields_validate() {
        let data = validate(&complete()).unwrap();
        assert_eq!(data.title, "Q3 Liquidity Review");
        assert_eq!(data.memo_date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(data.subtitle, None);
        assert_eq!(data.footer_line(), "");
    }

    #[test]
    fn test_each_missing_required_field_is_named_alone() {
        for spec in MEMO_FIELDS.iter().filter(|s| s.required) {
            let mut fields = complete();
            fields.remove(spec.key);

            let err = validate(&fields).unwrap_err();
            assert_eq!(err.fields(), vec![spec.key]);
            assert_eq!(err.issue_for(spec.key), Some(&IssueKind::Missing));
        }
    }

    #[test]
    fn test_blank_required_field_is_empty_not_missing() {
        let mut fields = complete();
        fields.insert("preparedBy", "   \t ");

        let err = validate(&fields).unwrap_err();
        assert_eq!(err.fields(), vec!["preparedBy"]);
        assert_eq!(err.issue_for("preparedBy"), Some(&IssueKind::Empty));
    }

    #[test]
    fn test_all_failures_reported_in_schema_order() {
        let fields: FieldSet = [("memoDate", "19/10/2026"), ("title", "")].into_iter().collect();

        let err = validate(&fields).unwrap_err();
        assert_eq!(err.fields(), vec!["title", "clientName", "preparedBy", "memoDate"]);
        assert!(matches!(err.issue_for("memoDate"), Some(IssueKind::Malformed { .. })));
    }

    #[test]
    fn test_impossible_date_is_malformed() {
        let mut fields = complete();
        fields.insert("memoDate", "2026-02-30");
        let err = validate(&fields).unwrap_err();
        assert_eq!(err.fields(), vec!["memoDate"]);
    }

    #[test]
    fn test_unpadded_date_is_malformed() {
        for date in ["2026-1-5", "2026-10-5", "2026-1-15", "+2026-10-19"] {
            let mut fields = complete();
            fields.insert("memoDate", date);
            let err = validate(&fields).unwrap_err();
            assert!(
                matches!(err.issue_for("memoDate"), Some(IssueKind::Malformed { .. })),
                "{date} was accepted"
            );
        }
    }

    #[test]
    fn test_values_are_trimmed_and_unknown_keys_ignored() {
        let mut fields = complete();
        fields.insert("title", "  Q3 Review \n");
        fields.insert("body", "line one\r\nline two");
        fields.insert("favouriteColour", "teal");

        let data = validate(&fields).unwrap();
        assert_eq!(data.title, "Q3 Review");
        assert_eq!(data.body.as_deref(), Some("line one\nline two"));
        assert!(!data.placeholders().contains("FAVOURITECOLOUR"));
    }

    #[test]
    fn test_blank_optional_field_is_absent() {
        let mut fields = complete();
        fields.insert("subtitle", "   ");
        let data = validate(&fields).unwrap();
        assert_eq!(data.subtitle, None);
    }

    #[test]
    fn test_footer_line_is_derived() {
        let mut fields = complete();
        fields.insert("footerLabel", "Reference");
        fields.insert("footerValue", " NW-204 ");

        let data = validate(&fields).unwrap();
        assert_eq!(data.footer_line(), "Reference: NW-204");
    }

    #[test]
    fn test_overlong_text_is_malformed() {
        let mut fields = complete();
        fields.insert("summary", "x".repeat(MAX_TEXT_LEN + 1));
        let err = validate(&fields).unwrap_err();
        assert!(matches!(err.issue_for("summary"), Some(IssueKind::Malformed { .. })));
    }

    #[test]
    fn test_empty_field_set_names_every_required_field() {
        let err = validate(&FieldSet::new()).unwrap_err();
        assert_eq!(err.fields(), vec!["title", "clientName", "preparedBy", "memoDate"]);
    }
}
