//! Snapshot configuration.
//!
//! [`PerturbConfig`] is the serializable description (split token, tokenizer
//! choice); [`SnapshotContext`] is the validated, shared form every snapshot
//! carries and hands down to the snapshots rewritten from it.

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{PerturbError, PerturbResult};
use crate::tokenizer::{Tokenizer, UnicodeWordTokenizer, WordTokenizer};

/// Separator placed between segments while a rewrite is in progress.
pub const DEFAULT_SPLIT_TOKEN: &str = ">>>>";

/// Which tokenizer a configuration builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    /// [`WordTokenizer`]
    Word,
    /// [`UnicodeWordTokenizer`]
    Unicode,
}

impl Default for TokenizerKind {
    fn default() -> Self {
        TokenizerKind::Word
    }
}

/// Configuration for building snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerturbConfig {
    /// Private separator joining segments during a rewrite.
    pub split_token: String,
    /// Tokenizer used for words and word counts.
    pub tokenizer: TokenizerKind,
    /// Words the tokenizer drops (only honored by [`TokenizerKind::Word`]).
    pub words_to_ignore: Vec<String>,
}

impl PerturbConfig {
    /// Default tokenizer and split token.
    pub fn standard() -> Self {
        Self {
            split_token: DEFAULT_SPLIT_TOKEN.to_string(),
            tokenizer: TokenizerKind::Word,
            words_to_ignore: Vec::new(),
        }
    }

    pub fn with_split_token(mut self, split_token: impl Into<String>) -> Self {
        self.split_token = split_token.into();
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: TokenizerKind) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_words_to_ignore(mut self, words: Vec<String>) -> Self {
        self.words_to_ignore = words;
        self
    }

    /// Validate the configuration and build a shareable context.
    pub fn build_context(&self) -> PerturbResult<Arc<SnapshotContext>> {
        let context = match self.tokenizer {
            TokenizerKind::Word => SnapshotContext::new(
                WordTokenizer::ignoring(self.words_to_ignore.iter().cloned()),
                self.split_token.clone(),
            )?,
            TokenizerKind::Unicode => {
                SnapshotContext::new(UnicodeWordTokenizer, self.split_token.clone())?
            }
        };
        Ok(Arc::new(context))
    }
}

impl Default for PerturbConfig {
    fn default() -> Self {
        Self::standard()
    }
}

static DEFAULT_CONTEXT: Lazy<Arc<SnapshotContext>> = Lazy::new(|| {
    Arc::new(SnapshotContext {
        tokenizer: Box::new(WordTokenizer::new()),
        split_token: DEFAULT_SPLIT_TOKEN.to_string(),
    })
});

/// Tokenizer and split token shared by a lineage of snapshots.
#[derive(Debug)]
pub struct SnapshotContext {
    tokenizer: Box<dyn Tokenizer>,
    split_token: String,
}

impl SnapshotContext {
    /// The split token must be non-empty and free of whitespace. It may
    /// contain word characters; rewrites never match a word across it.
    pub fn new(
        tokenizer: impl Tokenizer + 'static,
        split_token: impl Into<String>,
    ) -> PerturbResult<Self> {
        let split_token = split_token.into();
        if split_token.is_empty() {
            return Err(PerturbError::InvalidConfig {
                reason: "split token is empty".to_string(),
            });
        }
        if split_token.contains(char::is_whitespace) {
            return Err(PerturbError::InvalidConfig {
                reason: format!("split token {:?} contains whitespace", split_token),
            });
        }
        Ok(Self {
            tokenizer: Box::new(tokenizer),
            split_token,
        })
    }

    /// The context used by [`TextSnapshot::new`](crate::TextSnapshot::new).
    pub fn shared_default() -> Arc<SnapshotContext> {
        Arc::clone(&DEFAULT_CONTEXT)
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        &*self.tokenizer
    }

    pub fn split_token(&self) -> &str {
        &self.split_token
    }
}
