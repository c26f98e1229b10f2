//! Diagnostics returned by resource operations.

use serde::Serialize;
use std::fmt;

use crate::error::Error;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Operation failed
    Error,
    /// Operation went through with a caveat
    Warning,
}

/// One diagnostic entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Message
    pub summary: String,
    /// Attribute the entry is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            Some(attr) => write!(f, "{}: {}", attr, self.summary),
            None => write!(f, "{}", self.summary),
        }
    }
}

/// Ordered list of diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// List holding one error built from `err`
    pub fn from_err(err: impl Into<Error>) -> Self {
        let mut diags = Self::new();
        diags.push_err(err);
        diags
    }

    /// Append an error entry
    pub fn push_err(&mut self, err: impl Into<Error>) {
        let (summary, attribute) = match err.into() {
            Error::Validation { attribute, message } => (message, Some(attribute)),
            Error::StateWrite { attribute, message } => (
                format!("failed to set in resource state: {}", message),
                Some(attribute),
            ),
            err => (err.to_string(), None),
        };
        self.0.push(Diagnostic {
            severity: Severity::Error,
            summary,
            attribute,
        });
    }

    /// Append an error entry about one attribute
    pub fn attribute_error(&mut self, attribute: &str, summary: impl Into<String>) {
        self.0.push(Diagnostic {
            severity: Severity::Error,
            summary: summary.into(),
            attribute: Some(attribute.to_string()),
        });
    }

    /// Append a warning entry
    pub fn warning(&mut self, summary: impl Into<String>) {
        self.0.push(Diagnostic {
            severity: Severity::Warning,
            summary: summary.into(),
            attribute: None,
        });
    }

    /// Append every item as a warning
    pub fn append_warns<I>(&mut self, warns: I)
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        for warn in warns {
            self.warning(warn.to_string());
        }
    }

    /// Append another list, keeping order
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    /// Whether any entry is an error
    pub fn has_error(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    /// Iterate entries
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
