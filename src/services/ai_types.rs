use serde::{Deserialize, Serialize};

use crate::model::locale::FlatKeyMap;

/// Um lote de chaves enviado numa única chamada ao provedor.
#[derive(Debug, Clone)]
pub struct TranslationBatch {
    pub index: usize,
    pub entries: FlatKeyMap,
}

impl TranslationBatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TranslationResult {
    pub locale: String,
    pub total: usize,
    pub translated: usize,
    pub skipped: usize,
    pub errors: usize,
}
