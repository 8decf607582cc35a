use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

use crate::error::{Result, ToolError};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Decodifica o conteúdo de um arquivo de locale/config para `String`.
///
/// - BOM UTF-8 é removido (serde_json não aceita BOM)
/// - UTF-8 válido passa direto
/// - qualquer outra coisa passa pelo chardetng; se o decode tiver erros, falha
pub fn decode_text(bytes: &[u8], path: &Path) -> Result<String> {
    let body = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);

    if let Ok(s) = std::str::from_utf8(body) {
        return Ok(s.to_string());
    }

    let encoding = guess(body);
    if encoding == UTF_8 {
        return Err(ToolError::Encoding {
            path: path.to_path_buf(),
            encoding: "invalid utf-8".into(),
        });
    }

    let (text, _, had_errors) = encoding.decode(body);
    if had_errors {
        return Err(ToolError::Encoding {
            path: path.to_path_buf(),
            encoding: encoding.name().to_lowercase(),
        });
    }

    tracing::warn!(
        path = %path.display(),
        encoding = encoding.name(),
        "file is not UTF-8; decoded with detected encoding"
    );
    Ok(text.into_owned())
}

fn guess(bytes: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_utf8_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(br#"{"a":"b"}"#);
        let text = decode_text(&bytes, Path::new("en.json")).unwrap();
        assert_eq!(text, r#"{"a":"b"}"#);
    }

    #[test]
    fn plain_utf8_passes_through() {
        let text = decode_text("{\"k\":\"日本語\"}".as_bytes(), Path::new("ja.json")).unwrap();
        assert!(text.contains("日本語"));
    }

    #[test]
    fn legacy_encoding_is_decoded() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode("{\"k\":\"Caf\u{e9} cr\u{e8}me br\u{fb}l\u{e9}e, d\u{e9}j\u{e0} vu\"}");
        assert!(std::str::from_utf8(&bytes).is_err());
        let text = decode_text(&bytes, Path::new("fr.json")).unwrap();
        assert!(text.starts_with("{\"k\":\"Caf"));
        assert!(text.ends_with("\"}"));
    }
}
