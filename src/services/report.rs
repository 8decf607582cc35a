use std::path::Path;

use colored::Colorize;

use crate::config::ToolConfig;
use crate::error::Result;
use crate::model::issue::{IssueKind, LocaleValidationResult, Severity};
use crate::model::report::{ReportSummary, ValidationReport};
use crate::services::ai_types::TranslationResult;
use crate::services::locale_store;

const MAX_ISSUES_SHOWN: usize = 20;

/// Agregação pura: nada de IO aqui.
pub fn generate(source_locale: &str, strict: bool, results: Vec<LocaleValidationResult>) -> ValidationReport {
    let mut summary = ReportSummary {
        total_locales: results.len(),
        ..ReportSummary::default()
    };

    for r in &results {
        if r.passed {
            summary.passed += 1;
        } else {
            summary.failed += 1;
        }
        summary.total_errors += r.error_count();
        summary.total_warnings += r.warning_count();
    }

    ValidationReport {
        timestamp: chrono::Utc::now().to_rfc3339(),
        source_locale: source_locale.to_string(),
        strict,
        summary,
        results,
    }
}

pub fn write(report: &ValidationReport, path: &Path) -> Result<()> {
    locale_store::write_json(path, report)?;
    tracing::info!(path = %path.display(), "validation report written");
    Ok(())
}

/// Tabela no stdout + detalhes dos locales com problemas.
pub fn print(report: &ValidationReport, cfg: &ToolConfig) {
    println!();
    println!("{}", "i18n validation".bold());
    println!("source locale: {}", report.source_locale);
    println!();
    println!(
        "{:<8} {:<20} {:>6} {:>7} {:>9}  {}",
        "LOCALE", "LANGUAGE", "KEYS", "ERRORS", "WARNINGS", "STATUS"
    );

    for r in &report.results {
        let status = if r.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };
        println!(
            "{:<8} {:<20} {:>6} {:>7} {:>9}  {}",
            r.locale,
            cfg.locale_name(&r.locale),
            r.total_keys,
            r.error_count(),
            r.warning_count(),
            status
        );
    }

    for r in report.results.iter().filter(|r| !r.issues.is_empty()) {
        println!();
        let breakdown = [
            IssueKind::Missing,
            IssueKind::Empty,
            IssueKind::PlaceholderMismatch,
            IssueKind::InvalidJson,
            IssueKind::Identical,
        ]
        .iter()
        .map(|k| (k.as_str(), r.count_of(*k)))
        .filter(|(_, n)| *n > 0)
        .map(|(name, n)| format!("{name}: {n}"))
        .collect::<Vec<_>>()
        .join(", ");
        println!("{} ({})", r.locale.bold(), breakdown);

        for issue in r.issues.iter().take(MAX_ISSUES_SHOWN) {
            let tag = match issue.severity {
                Severity::Error => issue.kind.as_str().red(),
                Severity::Warning => issue.kind.as_str().yellow(),
            };
            println!("  [{}] {}: {}", tag, issue.key, issue.message);
        }

        if r.issues.len() > MAX_ISSUES_SHOWN {
            println!("  ... and {} more", r.issues.len() - MAX_ISSUES_SHOWN);
        }
    }

    let s = &report.summary;
    println!();
    println!(
        "{} locales: {} passed, {} failed | {} errors, {} warnings{}",
        s.total_locales,
        s.passed.to_string().green(),
        s.failed.to_string().red(),
        s.total_errors,
        s.total_warnings,
        if report.strict { " (strict)" } else { "" }
    );

    if report.is_success() {
        println!("{}", "Validation passed".green().bold());
    } else {
        println!("{}", "Validation failed".red().bold());
    }
}

pub fn print_translation(results: &[TranslationResult], cfg: &ToolConfig, dry_run: bool) {
    println!();
    println!(
        "{}",
        if dry_run {
            "i18n translation (dry run)".bold()
        } else {
            "i18n translation".bold()
        }
    );
    println!(
        "{:<8} {:<20} {:>6} {:>11} {:>8} {:>7}",
        "LOCALE", "LANGUAGE", "TOTAL", "TRANSLATED", "SKIPPED", "ERRORS"
    );

    for r in results {
        let errors = if r.errors > 0 {
            r.errors.to_string().red()
        } else {
            r.errors.to_string().normal()
        };
        println!(
            "{:<8} {:<20} {:>6} {:>11} {:>8} {:>7}",
            r.locale,
            cfg.locale_name(&r.locale),
            r.total,
            r.translated,
            r.skipped,
            errors
        );
    }
}
