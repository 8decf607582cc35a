use serde::{Deserialize, Serialize};

/// Chave sintética usada quando o problema é o arquivo inteiro.
pub const FILE_KEY: &str = "__FILE__";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Missing,
    Empty,
    PlaceholderMismatch,
    Identical,
    InvalidJson,
}

impl IssueKind {
    pub fn severity(self) -> Severity {
        match self {
            IssueKind::Identical => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::Missing => "missing",
            IssueKind::Empty => "empty",
            IssueKind::PlaceholderMismatch => "placeholder_mismatch",
            IssueKind::Identical => "identical",
            IssueKind::InvalidJson => "invalid_json",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,

    pub severity: Severity,

    pub key: String,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl ValidationIssue {
    pub fn new(kind: IssueKind, key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            key: key.into(),
            message: message.into(),
            source: None,
            target: None,
        }
    }

    pub fn with_texts(mut self, source: &str, target: Option<&str>) -> Self {
        self.source = Some(source.to_string());
        self.target = target.map(str::to_string);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LocaleValidationResult {
    pub locale: String,
    pub passed: bool,
    pub total_keys: usize,
    pub issues: Vec<ValidationIssue>,
}

impl LocaleValidationResult {
    /// `passed` é derivado: falha se existir qualquer issue de severidade error.
    pub fn from_issues(locale: &str, total_keys: usize, issues: Vec<ValidationIssue>) -> Self {
        let passed = !issues.iter().any(ValidationIssue::is_error);
        Self {
            locale: locale.to_string(),
            passed,
            total_keys,
            issues,
        }
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.len() - self.error_count()
    }

    pub fn count_of(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }
}
