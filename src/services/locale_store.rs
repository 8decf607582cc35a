use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, ToolError};
use crate::model::locale::LocaleFile;
use crate::services::encoding;

/// Lê um arquivo de locale sem abortar: ausente e inválido viram estados.
pub fn read_locale(path: &Path) -> LocaleFile {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return LocaleFile::Missing,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read locale file");
            return LocaleFile::Invalid {
                message: format!("failed to read {}: {e}", path.display()),
            };
        }
    };

    let text = match encoding::decode_text(&bytes, path) {
        Ok(t) => t,
        Err(e) => {
            return LocaleFile::Invalid {
                message: e.to_string(),
            }
        }
    };

    match serde_json::from_str::<Value>(&text) {
        Ok(v) => LocaleFile::Loaded(v),
        Err(e) => LocaleFile::Invalid {
            message: format!("invalid JSON in {}: {e}", path.display()),
        },
    }
}

/// O locale de origem é obrigatório: ausente ou inválido é fatal.
pub fn read_source(path: &Path) -> Result<Value> {
    match read_locale(path) {
        LocaleFile::Loaded(v) => Ok(v),
        LocaleFile::Missing => Err(ToolError::SourceMissing {
            path: path.to_path_buf(),
        }),
        LocaleFile::Invalid { message } => Err(ToolError::SourceInvalid {
            path: path.to_path_buf(),
            message,
        }),
    }
}

/// JSON com indentação de 2 espaços e newline final, gravado de forma atômica.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value).map_err(|source| ToolError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    json.push('\n');

    write_atomic(path, json.as_bytes())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let io_err = |source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    };

    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    fs::write(&tmp, bytes).map_err(io_err)?;

    // rename sobrescreve no unix; no windows o destino precisa sumir antes
    if cfg!(windows) && path.exists() {
        fs::remove_file(path).map_err(io_err)?;
    }

    fs::rename(&tmp, path).map_err(io_err)?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "locale".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}
