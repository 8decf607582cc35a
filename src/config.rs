use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};
use crate::services::encoding;

pub const REPORT_FILE: &str = "i18n-validation-report.json";

const DEFAULT_TARGETS: &[&str] = &["zh", "es", "pt", "id", "vi", "fr", "de", "ja", "ko"];

const DEFAULT_NAMES: &[(&str, &str)] = &[
    ("en", "English"),
    ("zh", "Simplified Chinese"),
    ("es", "Spanish"),
    ("pt", "Portuguese"),
    ("id", "Indonesian"),
    ("vi", "Vietnamese"),
    ("fr", "French"),
    ("de", "German"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
];

// Marca + acrônimos + formatos de arquivo que ficam iguais em todos os idiomas
const DEFAULT_PROTECTED: &[&str] = &[
    "DevKitBox", "JSON", "XML", "YAML", "CSV", "HTML", "CSS", "JavaScript", "URL", "URI",
    "UUID", "GUID", "Base64", "QR", "MD5", "SHA", "SHA-1", "SHA-256", "SHA-512", "HMAC",
    "JWT", "API", "HTTP", "HTTPS", "UTF-8", "ASCII", "Unicode", "RGB", "HEX", "HSL", "PNG",
    "JPG", "JPEG", "SVG", "PDF", "BMI",
];

fn default_locales_dir() -> PathBuf {
    PathBuf::from("locales")
}

fn default_source_locale() -> String {
    "en".to_string()
}

fn default_target_locales() -> Vec<String> {
    DEFAULT_TARGETS.iter().map(|s| s.to_string()).collect()
}

fn default_locale_names() -> IndexMap<String, String> {
    DEFAULT_NAMES
        .iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect()
}

fn default_protected_terms() -> Vec<String> {
    DEFAULT_PROTECTED.iter().map(|s| s.to_string()).collect()
}

fn default_report_path() -> PathBuf {
    PathBuf::from(REPORT_FILE)
}

/// Configuração do processo: montada uma vez na inicialização e nunca alterada.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_locales_dir")]
    pub locales_dir: PathBuf,

    #[serde(default = "default_source_locale")]
    pub source_locale: String,

    #[serde(default = "default_target_locales")]
    pub target_locales: Vec<String>,

    #[serde(default = "default_locale_names")]
    pub locale_names: IndexMap<String, String>,

    #[serde(default = "default_protected_terms")]
    pub protected_terms: Vec<String>,

    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    #[serde(default)]
    pub translation: TranslationSettings,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            locales_dir: default_locales_dir(),
            source_locale: default_source_locale(),
            target_locales: default_target_locales(),
            locale_names: default_locale_names(),
            protected_terms: default_protected_terms(),
            report_path: default_report_path(),
            translation: TranslationSettings::default(),
        }
    }
}

impl ToolConfig {
    /// Lê um arquivo de config JSON. Campos ausentes ficam com o default.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| ToolError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = encoding::decode_text(&bytes, path)?;
        let cfg: ToolConfig = serde_json::from_str(&text).map_err(|source| ToolError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.check()?;
        Ok(cfg)
    }

    pub fn check(&self) -> Result<()> {
        if self.source_locale.trim().is_empty() {
            return Err(ToolError::Config("source_locale must not be empty".into()));
        }
        if self.target_locales.iter().any(|l| l == &self.source_locale) {
            return Err(ToolError::Config(format!(
                "target_locales must not contain the source locale '{}'",
                self.source_locale
            )));
        }
        if self.translation.batch_size == 0 {
            return Err(ToolError::Config("translation.batch_size must be > 0".into()));
        }
        if self.translation.max_attempts == 0 {
            return Err(ToolError::Config("translation.max_attempts must be > 0".into()));
        }
        Ok(())
    }

    pub fn locale_path(&self, code: &str) -> PathBuf {
        self.locales_dir.join(format!("{code}.json"))
    }

    pub fn source_path(&self) -> PathBuf {
        self.locale_path(&self.source_locale)
    }

    /// Nome do idioma para exibição; sem nome cadastrado, volta o próprio código.
    pub fn locale_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.locale_names
            .get(code)
            .map(String::as_str)
            .unwrap_or(code)
    }

    /// Locales a processar: todos, ou só `only` quando for um alvo conhecido.
    pub fn select_targets(&self, only: Option<&str>) -> Result<Vec<String>> {
        match only {
            None => Ok(self.target_locales.clone()),
            Some(code) => {
                if self.target_locales.iter().any(|l| l == code) {
                    Ok(vec![code.to_string()])
                } else {
                    Err(ToolError::UnknownLocale(code.to_string()))
                }
            }
        }
    }
}

fn default_batch_size() -> usize {
    200
}

fn default_max_attempts() -> usize {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_batch_delay_ms() -> u64 {
    1000
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationSettings {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Total de tentativas por lote, contando a primeira chamada.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,

    #[serde(default = "default_openai_endpoint")]
    pub openai_endpoint: String,

    #[serde(default = "default_anthropic_endpoint")]
    pub anthropic_endpoint: String,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            batch_delay_ms: default_batch_delay_ms(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
            openai_model: default_openai_model(),
            anthropic_model: default_anthropic_model(),
            openai_endpoint: default_openai_endpoint(),
            anthropic_endpoint: default_anthropic_endpoint(),
        }
    }
}

impl TranslationSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
