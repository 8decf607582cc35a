use regex::Regex;

use crate::error::{Result, ToolError};

/// Termos que não se traduzem (marca, siglas, formatos de arquivo).
#[derive(Debug, Clone)]
pub struct ProtectedTerms {
    matcher: Option<Regex>,
}

impl ProtectedTerms {
    pub fn new(terms: &[String]) -> Result<Self> {
        let terms: Vec<String> = terms
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let matcher = if terms.is_empty() {
            None
        } else {
            let alternation = terms
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(r"(?i)\b(?:{alternation})\b");
            Some(Regex::new(&pattern).map_err(|e| ToolError::Config(format!("protected terms: {e}")))?)
        };

        Ok(Self { matcher })
    }

    /// Palavra inteira, sem diferenciar maiúsculas; "JSONify" não casa com "JSON".
    pub fn contains_protected_term(&self, text: &str) -> bool {
        self.matcher.as_ref().is_some_and(|re| re.is_match(text))
    }
}
