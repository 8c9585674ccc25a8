//! Ranked dictionary management
//!
//! Builds the `word -> rank` tables the dictionary matchers look words up in.
//! Word lists are one word per line, most frequent first; rank 1 is the most common word.
//!
//! The built-in lists are samples of a few hundred entries each, so less frequent words
//! pass unrecognized. A full list loads as the `custom` dictionary through
//! `PWD_DICTIONARY_PATH` or [`EstimatorConfig::dictionary_path`](crate::EstimatorConfig::dictionary_path).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PASSWORDS: &str = "passwords";
pub const ENGLISH: &str = "english";
pub const MALE_NAMES: &str = "male_names";
pub const FEMALE_NAMES: &str = "female_names";
pub const SURNAMES: &str = "surnames";
pub const USER_INPUTS: &str = "user_inputs";
pub const CUSTOM: &str = "custom";

const BUILTIN_WORD_LISTS: [(&str, &str); 5] = [
    (PASSWORDS, include_str!("../assets/passwords.txt")),
    (ENGLISH, include_str!("../assets/english.txt")),
    (MALE_NAMES, include_str!("../assets/male_names.txt")),
    (FEMALE_NAMES, include_str!("../assets/female_names.txt")),
    (SURNAMES, include_str!("../assets/surnames.txt")),
];

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("Dictionary file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read dictionary file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Dictionary file is empty")]
    EmptyFile,
}

/// Read-only `lowercase word -> rank` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedDictionary {
    name: String,
    ranks: HashMap<String, usize>,
    max_word_len: usize,
}

impl RankedDictionary {
    /// Ranks `words` by position (first word is rank 1). Keys are trimmed and lowercased;
    /// blank entries are skipped and a repeated word keeps its first rank.
    pub fn from_words<I, S>(name: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ranks = HashMap::new();
        let mut max_word_len = 0;
        let normalized = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty());

        for (index, word) in normalized.enumerate() {
            max_word_len = max_word_len.max(word.chars().count());
            ranks.entry(word).or_insert(index + 1);
        }

        Self {
            name: name.into(),
            ranks,
            max_word_len,
        }
    }

    /// Loads a word list file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File does not exist
    /// - File cannot be read
    /// - File is empty
    pub fn from_path<P: AsRef<Path>>(
        name: impl Into<String>,
        path: P,
    ) -> Result<Self, DictionaryError> {
        let path = path.as_ref();

        if !path.exists() {
            #[cfg(feature = "tracing")]
            tracing::error!("Dictionary load FAILED: FileNotFound {:?}", path);
            return Err(DictionaryError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;

        if content.trim().is_empty() {
            #[cfg(feature = "tracing")]
            tracing::error!("Dictionary load FAILED: Empty file {:?}", path);
            return Err(DictionaryError::EmptyFile);
        }

        let dictionary = Self::from_words(name, content.lines());

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Dictionary '{}' loaded: {} words from {:?}",
            dictionary.name,
            dictionary.len(),
            path
        );

        Ok(dictionary)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rank of an already-lowercased word.
    pub fn rank(&self, word: &str) -> Option<usize> {
        self.ranks.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Longest key, in characters. Substrings longer than this can be skipped.
    pub fn max_word_len(&self) -> usize {
        self.max_word_len
    }
}

/// The compiled-in word lists.
pub fn builtin_dictionaries() -> Vec<RankedDictionary> {
    BUILTIN_WORD_LISTS
        .iter()
        .map(|(name, content)| RankedDictionary::from_words(*name, content.lines()))
        .collect()
}
