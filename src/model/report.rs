use serde::{Deserialize, Serialize};

use super::issue::LocaleValidationResult;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_locales: usize,
    pub passed: usize,
    pub failed: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub timestamp: String,
    pub source_locale: String,
    pub strict: bool,
    pub summary: ReportSummary,
    pub results: Vec<LocaleValidationResult>,
}

impl ValidationReport {
    /// Decisão de saída do CLI. Em modo strict, warnings também falham a execução,
    /// mas o `passed` de cada locale não muda.
    pub fn is_success(&self) -> bool {
        if self.summary.failed > 0 {
            return false;
        }
        !(self.strict && self.summary.total_warnings > 0)
    }
}
