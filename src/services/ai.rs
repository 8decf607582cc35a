use std::{thread, time::Duration};

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::config::TranslationSettings;
use crate::error::{Result, ToolError};
use crate::model::locale::FlatKeyMap;
use crate::services::ai_types::TranslationBatch;

pub const DELIMITER: &str = "|||";

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const SYSTEM_PROMPT: &str = "You are a professional software localization translator. \
You translate user interface strings accurately and concisely, and you follow the output format exactly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    pub fn api_key_var(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Capacidade única que o tradutor em lote precisa: um prompt entra, texto sai.
pub trait CompletionBackend {
    fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

pub struct ProviderClient {
    kind: ProviderKind,
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_tokens: u32,
}

impl ProviderClient {
    pub fn new(
        kind: ProviderKind,
        settings: &TranslationSettings,
        api_key: String,
        model: Option<&str>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        let (default_model, endpoint) = match kind {
            ProviderKind::OpenAi => (&settings.openai_model, &settings.openai_endpoint),
            ProviderKind::Anthropic => (&settings.anthropic_model, &settings.anthropic_endpoint),
        };

        Ok(Self {
            kind,
            client,
            api_key,
            model: model.unwrap_or(default_model.as_str()).to_string(),
            endpoint: endpoint.clone(),
            max_tokens: settings.max_tokens,
        })
    }

    /// Chave de API vem só do ambiente; ausente é fatal.
    pub fn from_env(kind: ProviderKind, settings: &TranslationSettings, model: Option<&str>) -> Result<Self> {
        let var = kind.api_key_var();
        let api_key = match std::env::var(var) {
            Ok(k) if !k.trim().is_empty() => k,
            _ => return Err(ToolError::MissingApiKey(var)),
        };
        Self::new(kind, settings, api_key, model)
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, system: &str, prompt: &str) -> Value {
        match self.kind {
            ProviderKind::OpenAi => json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": prompt }
                ],
                "temperature": 0,
                "max_tokens": self.max_tokens
            }),
            ProviderKind::Anthropic => json!({
                "model": self.model,
                "system": system,
                "messages": [
                    { "role": "user", "content": prompt }
                ],
                "temperature": 0,
                "max_tokens": self.max_tokens
            }),
        }
    }
}

impl CompletionBackend for ProviderClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let body = self.request_body(system, prompt);

        let request = match self.kind {
            ProviderKind::OpenAi => self.client.post(&self.endpoint).bearer_auth(&self.api_key),
            ProviderKind::Anthropic => self
                .client
                .post(&self.endpoint)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
        };

        let resp = request.json(&body).send()?;
        let status = resp.status();

        // Lê como texto primeiro: isso evita perder mensagem de erro quando JSON falha
        let text = resp.text()?;

        if !status.is_success() {
            return Err(ToolError::ProviderStatus {
                status: status.as_u16(),
                message: extract_error_message(status, &text),
            });
        }

        let json: Value = serde_json::from_str(&text)
            .map_err(|e| ToolError::MalformedResponse(format!("invalid JSON from provider: {e}")))?;

        let content = match self.kind {
            ProviderKind::OpenAi => openai_content(&json),
            ProviderKind::Anthropic => anthropic_content(&json),
        }?;

        if content.trim().is_empty() {
            return Err(ToolError::EmptyResponse);
        }
        Ok(content)
    }
}

fn openai_content(json: &Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| ToolError::MalformedResponse("missing choices[0].message.content".into()))
}

fn anthropic_content(json: &Value) -> Result<String> {
    let blocks = json
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| ToolError::MalformedResponse("missing content array".into()))?;

    let text: String = blocks
        .iter()
        .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join("");

    Ok(text)
}

fn extract_error_message(status: StatusCode, body_text: &str) -> String {
    // { "error": { "message": "..." } } (os dois provedores) ou { "message": "..." }
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
    }

    let trimmed = body_text.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("empty error body")
            .to_string();
    }

    let snippet: String = trimmed.chars().take(400).collect();
    if snippet.len() < trimmed.len() {
        format!("{snippet}...")
    } else {
        snippet
    }
}

/// Contexto fixo do prompt para um locale.
pub struct PromptContext<'a> {
    pub source_language: &'a str,
    pub target_language: &'a str,
    pub target_code: &'a str,
    pub protected_terms: &'a [String],
}

pub fn build_prompt(batch: &TranslationBatch, ctx: &PromptContext<'_>) -> String {
    let mut p = String::new();

    p.push_str(&format!(
        "Translate the following user interface strings from {} to {} ({}).\n\n",
        ctx.source_language, ctx.target_language, ctx.target_code
    ));

    p.push_str("Rules:\n");
    p.push_str("1. Keep every placeholder in curly braces, such as {name} or {count}, exactly as written. You may move it within the sentence.\n");
    if ctx.protected_terms.is_empty() {
        p.push_str("2. Keep brand names and technical acronyms untranslated.\n");
    } else {
        p.push_str(&format!(
            "2. Do not translate these terms: {}.\n",
            ctx.protected_terms.join(", ")
        ));
    }
    p.push_str("3. Keep HTML tags and their attributes exactly as they are; translate only the text between them.\n");
    p.push_str("4. Keep emoji exactly as they are.\n");
    p.push_str("5. A literal \\n marks a line break and \\\\ marks a backslash; keep both exactly as written.\n");
    p.push_str(&format!(
        "6. Output exactly one line per entry in the form key{DELIMITER}translation, keeping each key unchanged. Output nothing else.\n\n"
    ));

    p.push_str("Entries:\n");
    for (key, text) in &batch.entries {
        p.push_str(key);
        p.push_str(DELIMITER);
        p.push_str(&escape_line(text));
        p.push('\n');
    }

    p
}

/// Uma entrada por linha: `\` vira `\\` e quebra de linha vira `\n`.
fn escape_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }

    out
}

/// Inverso de [`escape_line`], numa passada só. Barra solta fica como está.
fn unescape_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Lê `chave|||tradução` linha a linha. Chaves fora do lote são ignoradas.
/// Resposta sem nenhuma entrada aproveitável conta como falha do provedor.
pub fn parse_response(text: &str, batch: &TranslationBatch) -> Result<FlatKeyMap> {
    let mut out = FlatKeyMap::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("```") {
            continue;
        }

        let Some((key, value)) = line.split_once(DELIMITER) else {
            continue;
        };

        let key = key.trim();
        if !batch.entries.contains_key(key) {
            tracing::debug!(key, "ignoring key not present in batch");
            continue;
        }

        out.insert(key.to_string(), unescape_line(value.trim()));
    }

    if out.is_empty() {
        return Err(ToolError::MalformedResponse(
            "no key|||translation lines found".into(),
        ));
    }

    Ok(out)
}

/// Uma chamada + parse, repetida até `max_attempts` vezes com atraso fixo.
pub fn translate_batch(
    backend: &dyn CompletionBackend,
    batch: &TranslationBatch,
    ctx: &PromptContext<'_>,
    max_attempts: usize,
    retry_delay: Duration,
) -> Result<FlatKeyMap> {
    let prompt = build_prompt(batch, ctx);
    let attempts = max_attempts.max(1);
    let mut last_err: Option<ToolError> = None;

    for attempt in 1..=attempts {
        let outcome = backend
            .complete(SYSTEM_PROMPT, &prompt)
            .and_then(|text| parse_response(&text, batch));

        match outcome {
            Ok(parsed) => return Ok(parsed),
            Err(e) => {
                tracing::warn!(
                    locale = ctx.target_code,
                    batch = batch.index + 1,
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    "batch attempt failed"
                );
                last_err = Some(e);
                if attempt < attempts {
                    thread::sleep(retry_delay);
                }
            }
        }
    }

    Err(last_err.unwrap_or(ToolError::EmptyResponse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::{Cell, RefCell};

    struct Scripted {
        replies: RefCell<Vec<Result<String>>>,
        calls: Cell<usize>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: RefCell::new(replies),
                calls: Cell::new(0),
            }
        }
    }

    impl CompletionBackend for Scripted {
        fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            let mut replies = self.replies.borrow_mut();
            if replies.is_empty() {
                return Err(ToolError::EmptyResponse);
            }
            replies.remove(0)
        }
    }

    fn batch(pairs: &[(&str, &str)]) -> TranslationBatch {
        TranslationBatch {
            index: 0,
            entries: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn ctx(terms: &[String]) -> PromptContext<'_> {
        PromptContext {
            source_language: "English",
            target_language: "French",
            target_code: "fr",
            protected_terms: terms,
        }
    }

    #[test]
    fn provider_names_and_key_vars() {
        assert_eq!(ProviderKind::OpenAi.name(), "openai");
        assert_eq!(ProviderKind::OpenAi.api_key_var(), "OPENAI_API_KEY");
        assert_eq!(ProviderKind::Anthropic.name(), "anthropic");
        assert_eq!(ProviderKind::Anthropic.api_key_var(), "ANTHROPIC_API_KEY");
    }

    #[test]
    fn prompt_lists_rules_and_entries() {
        let terms = vec!["JSON".to_string(), "Base64".to_string()];
        let b = batch(&[("tools.title", "Hello {name}"), ("multi", "line one\nline two")]);
        let prompt = build_prompt(&b, &ctx(&terms));

        assert!(prompt.contains("from English to French (fr)"));
        assert!(prompt.contains("Do not translate these terms: JSON, Base64."));
        assert!(prompt.contains("HTML"));
        assert!(prompt.contains("emoji"));
        assert!(prompt.contains("tools.title|||Hello {name}\n"));
        assert!(prompt.contains("multi|||line one\\nline two\n"));
    }

    #[test]
    fn parse_reads_delimited_lines_and_skips_noise() {
        let b = batch(&[("a", "One"), ("b", "Two"), ("c", "Three\nFour")]);
        let text = "```\nHere you go:\na ||| Un\nb|||Deux|||extra\nunknown|||x\nc|||Trois\\nQuatre\n```";
        let parsed = parse_response(text, &b).unwrap();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed["a"], "Un");
        assert_eq!(parsed["b"], "Deux|||extra");
        assert_eq!(parsed["c"], "Trois\nQuatre");
    }

    #[rstest]
    #[case("plain text")]
    #[case("Use \\n for a newline")]
    #[case("line one\nline two")]
    #[case("ends with a backslash \\")]
    #[case("\\\\n")]
    fn escaping_is_reversible(#[case] text: &str) {
        let escaped = escape_line(text);
        assert!(!escaped.contains('\n'));
        assert_eq!(unescape_line(&escaped), text);
    }

    #[test]
    fn crlf_becomes_a_single_break() {
        assert_eq!(escape_line("a\r\nb"), "a\\nb");
        assert_eq!(unescape_line("stray \\t stays"), "stray \\t stays");
    }

    #[test]
    fn parse_without_entries_is_malformed() {
        let b = batch(&[("a", "One")]);
        assert!(matches!(
            parse_response("Sorry, I cannot help with that.", &b),
            Err(ToolError::MalformedResponse(_))
        ));
    }

    #[test]
    fn retries_until_success() {
        let backend = Scripted::new(vec![
            Err(ToolError::EmptyResponse),
            Ok("garbage".into()),
            Ok("a|||Un".into()),
        ]);
        let b = batch(&[("a", "One")]);
        let terms = Vec::new();

        let parsed = translate_batch(&backend, &b, &ctx(&terms), 3, Duration::ZERO).unwrap();
        assert_eq!(parsed["a"], "Un");
        assert_eq!(backend.calls.get(), 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let backend = Scripted::new(vec![
            Err(ToolError::EmptyResponse),
            Err(ToolError::EmptyResponse),
            Err(ToolError::EmptyResponse),
            Ok("a|||Un".into()),
        ]);
        let b = batch(&[("a", "One")]);
        let terms = Vec::new();

        let err = translate_batch(&backend, &b, &ctx(&terms), 3, Duration::ZERO).unwrap_err();
        assert!(matches!(err, ToolError::EmptyResponse));
        assert_eq!(backend.calls.get(), 3);
    }

    #[test]
    fn error_message_prefers_provider_json() {
        let msg = extract_error_message(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#,
        );
        assert_eq!(msg, "Rate limit reached");

        let raw = extract_error_message(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(raw, "<html>bad gateway</html>");

        let empty = extract_error_message(StatusCode::SERVICE_UNAVAILABLE, "  ");
        assert_eq!(empty, "Service Unavailable");
    }

    #[test]
    fn response_content_extraction() {
        let openai = json!({ "choices": [{ "message": { "content": "a|||Un" } }] });
        assert_eq!(openai_content(&openai).unwrap(), "a|||Un");
        assert!(openai_content(&json!({ "choices": [] })).is_err());

        let anthropic = json!({
            "content": [
                { "type": "text", "text": "a|||Un\n" },
                { "type": "text", "text": "b|||Deux" }
            ]
        });
        assert_eq!(anthropic_content(&anthropic).unwrap(), "a|||Un\nb|||Deux");
        assert!(anthropic_content(&json!({})).is_err());
    }

    #[test]
    fn request_bodies_follow_each_api() {
        let settings = TranslationSettings::default();

        let openai = ProviderClient::new(ProviderKind::OpenAi, &settings, "k".into(), None).unwrap();
        let body = openai.request_body("sys", "hi");
        assert_eq!(body["model"], settings.openai_model.as_str());
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["temperature"], 0);

        let anthropic =
            ProviderClient::new(ProviderKind::Anthropic, &settings, "k".into(), Some("custom")).unwrap();
        let body = anthropic.request_body("sys", "hi");
        assert_eq!(anthropic.model(), "custom");
        assert_eq!(body["system"], "sys");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["max_tokens"], settings.max_tokens);
    }
}
