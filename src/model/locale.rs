use indexmap::IndexMap;
use serde_json::Value;

/// Caminho com pontos ("a.b.c") -> texto.
pub type FlatKeyMap = IndexMap<String, String>;

/// Estado de um arquivo de locale no disco.
#[derive(Debug, Clone, PartialEq)]
pub enum LocaleFile {
    Missing,
    Invalid { message: String },
    Loaded(Value),
}
