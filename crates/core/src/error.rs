// src/error.rs
//! Error types for the core stages.
//!
//! `ValidationError` is the caller's problem; `ConfigurationError` is a
//! deployment problem. They are kept apart so the HTTP layer can map them to
//! different status codes.

use memo_traits::ResourceError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "lowercase")]
pub enum IssueKind {
    /// The field was not submitted at all.
    Missing,
    /// The field was submitted but is blank after trimming.
    Empty,
    /// The field has a value of the wrong shape.
    Malformed { reason: String },
}

/// One rejected field, named by its form key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Missing => write!(f, "{} is required", self.field),
            IssueKind::Empty => write!(f, "{} must not be empty", self.field),
            IssueKind::Malformed { reason } => write!(f, "{} is malformed: {}", self.field, reason),
        }
    }
}

/// Caller-supplied fields failed validation. Carries every failing field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub(crate) fn new(issues: Vec<FieldIssue>) -> Self {
        debug_assert!(!issues.is_empty());
        Self { issues }
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Form keys of the failing fields, in schema order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.issues.iter().map(|issue| issue.field).collect()
    }

    pub fn issue_for(&self, field: &str) -> Option<&IssueKind> {
        self.issues
            .iter()
            .find(|issue| issue.field == field)
            .map(|issue| &issue.kind)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Invalid memo fields: ")?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// A template resource the assembler needs could not be loaded.
///
/// The message names the logical template only. The underlying
/// `ResourceError` (which may carry a filesystem path) is kept as the source
/// for logging.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Template resource '{template}' is unavailable")]
    TemplateUnavailable {
        template: &'static str,
        #[source]
        source: ResourceError,
    },
}

impl ConfigurationError {
    pub fn template(&self) -> &'static str {
        match self {
            ConfigurationError::TemplateUnavailable { template, .. } => template,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_validation_error_lists_every_issue() {
        let err = ValidationError::new(vec![
            FieldIssue { field: "title", kind: IssueKind::Missing },
            FieldIssue { field: "clientName", kind: IssueKind::Empty },
        ]);

        assert_eq!(err.fields(), vec!["title", "clientName"]);
        assert_eq!(err.issue_for("clientName"), Some(&IssueKind::Empty));
        assert_eq!(
            err.to_string(),
            "Invalid memo fields: title is required; clientName must not be empty"
        );
    }

    #[test]
    fn test_field_issue_serializes_flat() {
        let issue = FieldIssue {
            field: "memoDate",
            kind: IssueKind::Malformed { reason: "expected YYYY-MM-DD".into() },
        };
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "field": "memoDate",
                "issue": "malformed",
                "reason": "expected YYYY-MM-DD"
            })
        );
    }

    #[test]
    fn test_configuration_error_hides_path() {
        let err = ConfigurationError::TemplateUnavailable {
            template: "document.html",
            source: ResourceError::LoadFailed {
                path: "/srv/memo/templates/document.html".into(),
                message: "permission denied".into(),
            },
        };

        assert_eq!(err.to_string(), "Template resource 'document.html' is unavailable");
        assert!(!err.to_string().contains("/srv"));
        assert!(err.source().unwrap().to_string().contains("/srv"));
        assert_eq!(err.template(), "document.html");
    }
}
