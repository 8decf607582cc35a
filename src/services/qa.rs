use crate::config::ToolConfig;
use crate::error::Result;
use crate::model::issue::{IssueKind, LocaleValidationResult, ValidationIssue, FILE_KEY};
use crate::model::locale::{FlatKeyMap, LocaleFile};
use crate::model::report::ValidationReport;
use crate::services::protected::ProtectedTerms;
use crate::services::{flatten, locale_store, placeholder, report};

/// Compara um locale alvo com o de origem, chave a chave.
///
/// Ausente e vazio encerram a verificação da chave; placeholder também.
/// Idêntico ao original só gera warning e não bloqueia.
pub fn validate_locale(
    locale: &str,
    source: &FlatKeyMap,
    target: &LocaleFile,
    protected: &ProtectedTerms,
) -> LocaleValidationResult {
    let total_keys = source.len();

    let tree = match target {
        LocaleFile::Missing => {
            let issue = ValidationIssue::new(
                IssueKind::Missing,
                FILE_KEY,
                format!("Locale file for '{locale}' not found"),
            );
            return LocaleValidationResult::from_issues(locale, total_keys, vec![issue]);
        }
        LocaleFile::Invalid { message } => {
            let issue = ValidationIssue::new(IssueKind::InvalidJson, FILE_KEY, message.clone());
            return LocaleValidationResult::from_issues(locale, total_keys, vec![issue]);
        }
        LocaleFile::Loaded(tree) => tree,
    };

    let flat = flatten::flatten(tree, "");
    let mut issues: Vec<ValidationIssue> = Vec::new();

    for (key, src) in source {
        if let Some(issue) = check_key(key, src, flat.get(key).map(String::as_str), protected) {
            issues.push(issue);
        }
    }

    LocaleValidationResult::from_issues(locale, total_keys, issues)
}

fn check_key(
    key: &str,
    source: &str,
    target: Option<&str>,
    protected: &ProtectedTerms,
) -> Option<ValidationIssue> {
    let target = match target {
        Some(t) => t,
        None => {
            return Some(
                ValidationIssue::new(IssueKind::Missing, key, "Missing translation key")
                    .with_texts(source, None),
            );
        }
    };

    if target.trim().is_empty() {
        return Some(
            ValidationIssue::new(IssueKind::Empty, key, "Translation is empty")
                .with_texts(source, Some(target)),
        );
    }

    if let Some(issue) = placeholder::validate_placeholders(key, source, target) {
        return Some(issue);
    }

    if target == source && !protected.contains_protected_term(source) {
        return Some(
            ValidationIssue::new(
                IssueKind::Identical,
                key,
                "Translation is identical to the source text (possibly untranslated)",
            )
            .with_texts(source, Some(target)),
        );
    }

    None
}

/// Valida todos os locales alvo (ou só `only`) e monta o relatório.
pub fn run(cfg: &ToolConfig, only: Option<&str>, strict: bool) -> Result<ValidationReport> {
    let targets = cfg.select_targets(only)?;
    let protected = ProtectedTerms::new(&cfg.protected_terms)?;

    let source_path = cfg.source_path();
    let source_tree = locale_store::read_source(&source_path)?;
    let source = flatten::flatten(&source_tree, "");

    tracing::info!(
        source = %cfg.source_locale,
        keys = source.len(),
        locales = targets.len(),
        "validating locales"
    );

    let mut results = Vec::with_capacity(targets.len());

    for code in &targets {
        let target = locale_store::read_locale(&cfg.locale_path(code));
        let result = validate_locale(code, &source, &target, &protected);

        tracing::info!(
            locale = %code,
            passed = result.passed,
            errors = result.error_count(),
            warnings = result.warning_count(),
            "locale checked"
        );

        results.push(result);
    }

    Ok(report::generate(&cfg.source_locale, strict, results))
}
