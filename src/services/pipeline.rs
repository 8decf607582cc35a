use std::thread;

use crate::config::{ToolConfig, TranslationSettings};
use crate::error::Result;
use crate::model::locale::{FlatKeyMap, LocaleFile};
use crate::services::ai::{self, CompletionBackend, PromptContext, ProviderClient, ProviderKind};
use crate::services::ai_types::{TranslationBatch, TranslationResult};
use crate::services::{flatten, locale_store, placeholder};

pub struct TranslateOptions<'a> {
    pub provider: ProviderKind,
    pub model: Option<&'a str>,
    pub locale: Option<&'a str>,
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct LocaleTranslation {
    pub result: TranslationResult,
    pub merged: FlatKeyMap,
}

/// Chave precisa de tradução se não existe no alvo, está em branco, ou é igual ao original.
pub fn partition(source: &FlatKeyMap, target: &FlatKeyMap) -> (FlatKeyMap, usize) {
    let mut needed = FlatKeyMap::new();
    let mut skipped = 0usize;

    for (key, src) in source {
        match target.get(key) {
            Some(t) if !t.trim().is_empty() && t != src => skipped += 1,
            _ => {
                needed.insert(key.clone(), src.clone());
            }
        }
    }

    (needed, skipped)
}

pub fn make_batches(needed: &FlatKeyMap, batch_size: usize) -> Vec<TranslationBatch> {
    let size = batch_size.max(1);
    let mut batches: Vec<TranslationBatch> = Vec::new();
    let mut current = FlatKeyMap::with_capacity(size);

    for (key, text) in needed {
        current.insert(key.clone(), text.clone());

        if current.len() == size {
            batches.push(TranslationBatch {
                index: batches.len(),
                entries: std::mem::take(&mut current),
            });
        }
    }

    if !current.is_empty() {
        batches.push(TranslationBatch {
            index: batches.len(),
            entries: current,
        });
    }

    batches
}

/// Ordem do original primeiro; chaves que só existem no alvo vão no fim.
pub fn merge(source: &FlatKeyMap, target: &FlatKeyMap, translations: &FlatKeyMap) -> FlatKeyMap {
    let mut out = FlatKeyMap::with_capacity(source.len());

    for key in source.keys() {
        if let Some(t) = translations.get(key).or_else(|| target.get(key)) {
            out.insert(key.clone(), t.clone());
        }
    }

    for (key, t) in target {
        if !out.contains_key(key) {
            out.insert(key.clone(), t.clone());
        }
    }

    out
}

/// Traduz tudo o que falta para um locale, lote a lote, sem tocar no disco.
pub fn translate_locale(
    backend: &dyn CompletionBackend,
    source: &FlatKeyMap,
    target: &FlatKeyMap,
    ctx: &PromptContext<'_>,
    settings: &TranslationSettings,
) -> LocaleTranslation {
    let (needed, skipped) = partition(source, target);
    let batches = make_batches(&needed, settings.batch_size);

    let mut result = TranslationResult {
        locale: ctx.target_code.to_string(),
        total: source.len(),
        skipped,
        ..TranslationResult::default()
    };

    tracing::info!(
        locale = ctx.target_code,
        needed = needed.len(),
        skipped,
        batches = batches.len(),
        "translating locale"
    );

    let mut translations = FlatKeyMap::new();

    for (i, batch) in batches.iter().enumerate() {
        if i > 0 {
            thread::sleep(settings.batch_delay());
        }

        let parsed = match ai::translate_batch(
            backend,
            batch,
            ctx,
            settings.max_attempts,
            settings.retry_delay(),
        ) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(
                    locale = ctx.target_code,
                    batch = batch.index + 1,
                    keys = batch.len(),
                    error = %e,
                    "batch failed after all attempts"
                );
                result.errors += batch.len();
                continue;
            }
        };

        for (key, src) in &batch.entries {
            match parsed.get(key) {
                Some(t) if !t.trim().is_empty() && placeholder::placeholders_match(src, t) => {
                    translations.insert(key.clone(), t.clone());
                    result.translated += 1;
                }
                Some(t) => {
                    tracing::warn!(
                        locale = ctx.target_code,
                        key = %key,
                        translation = %t,
                        "placeholder mismatch or blank translation; keeping source text"
                    );
                    translations.insert(key.clone(), src.clone());
                    result.errors += 1;
                }
                None => {
                    tracing::warn!(
                        locale = ctx.target_code,
                        key = %key,
                        "key missing from provider response; keeping source text"
                    );
                    translations.insert(key.clone(), src.clone());
                    result.errors += 1;
                }
            }
        }

        tracing::info!(
            locale = ctx.target_code,
            batch = batch.index + 1,
            of = batches.len(),
            "batch done"
        );
    }

    let merged = merge(source, target, &translations);
    LocaleTranslation { result, merged }
}

pub fn run(cfg: &ToolConfig, opts: &TranslateOptions<'_>) -> Result<Vec<TranslationResult>> {
    let targets = cfg.select_targets(opts.locale)?;

    // Chave de API primeiro: sem ela nada roda (exceto dry-run)
    let backend = if opts.dry_run {
        None
    } else {
        Some(ProviderClient::from_env(opts.provider, &cfg.translation, opts.model)?)
    };

    let source_tree = locale_store::read_source(&cfg.source_path())?;
    let source = flatten::flatten(&source_tree, "");

    match backend {
        Some(client) => {
            tracing::info!(
                provider = client.kind().name(),
                model = client.model(),
                locales = targets.len(),
                keys = source.len(),
                "starting translation"
            );
            run_with_backend(cfg, &targets, &source, &client)
        }
        None => Ok(dry_run(cfg, &targets, &source)),
    }
}

pub fn run_with_backend(
    cfg: &ToolConfig,
    targets: &[String],
    source: &FlatKeyMap,
    backend: &dyn CompletionBackend,
) -> Result<Vec<TranslationResult>> {
    let source_language = cfg.locale_name(&cfg.source_locale);
    let mut results = Vec::with_capacity(targets.len());

    for code in targets {
        let path = cfg.locale_path(code);

        let target = match locale_store::read_locale(&path) {
            LocaleFile::Loaded(tree) => flatten::flatten(&tree, ""),
            LocaleFile::Missing => {
                tracing::info!(locale = %code, "no locale file yet; starting from scratch");
                FlatKeyMap::new()
            }
            LocaleFile::Invalid { message } => {
                // não sobrescreve um arquivo que não conseguimos ler
                tracing::error!(locale = %code, error = %message, "skipping locale");
                results.push(TranslationResult {
                    locale: code.clone(),
                    total: source.len(),
                    errors: source.len(),
                    ..TranslationResult::default()
                });
                continue;
            }
        };

        let ctx = PromptContext {
            source_language,
            target_language: cfg.locale_name(code),
            target_code: code,
            protected_terms: &cfg.protected_terms,
        };

        let outcome = translate_locale(backend, source, &target, &ctx, &cfg.translation);

        if outcome.merged != target {
            locale_store::write_json(&path, &flatten::unflatten(&outcome.merged))?;
            tracing::info!(locale = %code, path = %path.display(), "locale file updated");
        }

        results.push(outcome.result);
    }

    Ok(results)
}

fn dry_run(cfg: &ToolConfig, targets: &[String], source: &FlatKeyMap) -> Vec<TranslationResult> {
    targets
        .iter()
        .map(|code| {
            let target = match locale_store::read_locale(&cfg.locale_path(code)) {
                LocaleFile::Loaded(tree) => flatten::flatten(&tree, ""),
                _ => FlatKeyMap::new(),
            };
            let (needed, skipped) = partition(source, &target);
            let batches = make_batches(&needed, cfg.translation.batch_size).len();

            tracing::info!(locale = %code, needed = needed.len(), skipped, batches, "dry run");

            TranslationResult {
                locale: code.clone(),
                total: source.len(),
                skipped,
                ..TranslationResult::default()
            }
        })
        .collect()
}
