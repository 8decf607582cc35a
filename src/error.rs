use std::path::PathBuf;

use thiserror::Error;

/// Erros da ferramenta de locales.
///
/// Problemas por chave não são erros, são `ValidationIssue`. Aqui ficam
/// falhas de IO, parse, configuração e provedor.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not decode {path} as text ({encoding})")]
    Encoding { path: PathBuf, encoding: String },

    #[error("source locale file {path} is missing")]
    SourceMissing { path: PathBuf },

    #[error("source locale file {path} is unusable: {message}")]
    SourceInvalid { path: PathBuf, message: String },

    #[error("unknown locale '{0}'")]
    UnknownLocale(String),

    #[error("environment variable {0} is not set")]
    MissingApiKey(&'static str),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    ProviderStatus { status: u16, message: String },

    #[error("provider returned an empty response")]
    EmptyResponse,

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ToolError>;
