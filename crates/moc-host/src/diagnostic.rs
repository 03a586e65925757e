//! Compiler diagnostics as reported by the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Zero-based position inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based character offset within the line.
    pub character: u32,
}

impl Position {
    /// Builds a position from a line and character offset.
    #[must_use]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Half-open span between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// First position covered by the span.
    pub start: Position,
    /// Position just past the span.
    pub end: Position,
}

impl Range {
    /// Builds a range from its endpoints.
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Scalar carried by a targeted diagnostic code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetedValue {
    /// Textual code value.
    Text(String),
    /// Numeric code value.
    Number(i64),
}

/// Backend-specific diagnostic code. The facade never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiagnosticCode {
    /// Textual code such as `M0057`.
    Text(String),
    /// Numeric code.
    Number(i64),
    /// Code paired with a target such as a documentation link.
    Targeted {
        /// Opaque target attached by the backend.
        target: serde_json::Value,
        /// Code value.
        value: TargetedValue,
    },
}

/// Severity label attached to a diagnostic.
///
/// Labels the facade does not recognise are preserved verbatim so a newer
/// backend never loses information on the way through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    /// Compilation cannot succeed.
    Error,
    /// Suspicious but accepted code.
    Warning,
    /// Informational note.
    Information,
    /// Editor hint.
    Hint,
    /// Label outside the known set.
    Other(String),
}

impl Severity {
    /// Returns the label as reported by the backend.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "information",
            Self::Hint => "hint",
            Self::Other(label) => label.as_str(),
        }
    }
}

impl From<String> for Severity {
    fn from(label: String) -> Self {
        match label.as_str() {
            "error" => Self::Error,
            "warning" => Self::Warning,
            "information" => Self::Information,
            "hint" => Self::Hint,
            _ => Self::Other(label),
        }
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Other(label) => label,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One compiler-reported issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<DiagnosticCode>,
    message: String,
    range: Range,
    severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
}

impl Diagnostic {
    /// Builds a diagnostic without code, source, or tags.
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>, range: Range) -> Self {
        Self {
            code: None,
            message: message.into(),
            range,
            severity,
            source: None,
            tags: Vec::new(),
        }
    }

    /// Attaches a backend code.
    #[must_use]
    pub fn with_code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Records the subsystem that produced the diagnostic.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Replaces the classification tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Backend code, if any.
    #[must_use]
    pub const fn code(&self) -> Option<&DiagnosticCode> {
        self.code.as_ref()
    }

    /// Human-readable message.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Span the diagnostic refers to.
    #[must_use]
    pub const fn range(&self) -> Range {
        self.range
    }

    /// Severity label.
    #[must_use]
    pub const fn severity(&self) -> &Severity {
        &self.severity
    }

    /// Originating subsystem, if reported.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Classification tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns `true` for error-level diagnostics.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Joins diagnostic messages the way compilation failures report them.
pub(crate) fn join_messages(diagnostics: Option<&[Diagnostic]>) -> String {
    match diagnostics {
        Some(list) if !list.is_empty() => list
            .iter()
            .map(Diagnostic::message)
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::from("(no diagnostics)"),
    }
}
