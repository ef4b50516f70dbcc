// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Vocabulary persistence for the neural backend.
//
// Word splitting is done by data::tokens (it keeps emails whole
// and tracks char offsets, which a HuggingFace pre-tokenizer would
// not). What the neural model still needs is a stable
// word → embedding-row mapping that is identical at train and
// predict time. That mapping is stored as a WordLevel tokenizer
// JSON, so the file is loadable with `Tokenizer::from_file` like
// any other HuggingFace vocabulary.
//
// Ids: 0 = [PAD] (window positions past the text edge),
//      1 = [UNK] (words never seen in training), words from 2.
// Words are ordered by frequency, then alphabetically, so the
// same corpus always gives the same ids.

use anyhow::{Context, Result};
use std::{collections::HashMap, path::PathBuf};
use tokenizers::Tokenizer;

pub const PAD_ID: u32 = 0;
pub const UNK_ID: u32 = 1;

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self) -> PathBuf {
        self.dir.join("tokenizer.json")
    }

    /// Load a previously saved vocabulary
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.path();
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e))
    }

    /// Build a vocabulary from lowercased words, save it, and
    /// return it with its size (embedding rows needed).
    pub fn build_and_save(&self, words: &[String]) -> Result<(Tokenizer, usize)> {
        std::fs::create_dir_all(&self.dir).ok();

        let mut freq: HashMap<&str, usize> = HashMap::new();
        for w in words {
            *freq.entry(w.as_str()).or_insert(0) += 1;
        }
        let mut ranked: Vec<(&str, usize)> = freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

        let mut vocab = serde_json::Map::new();
        vocab.insert("[PAD]".to_string(), serde_json::json!(PAD_ID));
        vocab.insert("[UNK]".to_string(), serde_json::json!(UNK_ID));
        let mut next_id = UNK_ID + 1;
        for (word, _) in ranked {
            if !vocab.contains_key(word) {
                vocab.insert(word.to_string(), serde_json::json!(next_id));
                next_id += 1;
            }
        }

        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": PAD_ID, "content": "[PAD]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": UNK_ID, "content": "[UNK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": { "type": "Lowercase" },
            "pre_tokenizer": { "type": "WhitespaceSplit" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        let path = self.path();
        std::fs::write(&path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| format!("Cannot write tokenizer JSON '{}'", path.display()))?;

        tracing::info!(
            "Vocabulary built with {} entries, saved to '{}'",
            next_id,
            path.display()
        );

        let tokenizer = Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))?;
        Ok((tokenizer, next_id as usize))
    }
}

/// Embedding row for a (lowercased) word.
pub fn word_id(tokenizer: &Tokenizer, word: &str) -> u32 {
    tokenizer.token_to_id(word).unwrap_or(UNK_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_vocabulary_ids_are_stable() {
        let dir   = TempDir::new().unwrap();
        let store = TokenizerStore::new(dir.path());
        let words: Vec<String> = ["name", ":", "jane", "name", ":", "tom"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let (tok, size) = store.build_and_save(&words).unwrap();
        assert_eq!(size, 6);
        // ":" and "name" both appear twice; ties broken alphabetically
        assert_eq!(word_id(&tok, ":"), 2);
        assert_eq!(word_id(&tok, "name"), 3);
        assert_eq!(word_id(&tok, "jane"), 4);
        assert_eq!(word_id(&tok, "unseen"), UNK_ID);

        let reloaded = store.load().unwrap();
        assert_eq!(word_id(&reloaded, "tom"), 5);
    }
}
