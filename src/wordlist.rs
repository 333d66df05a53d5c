// This file is part of gmdp.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! BIP39-style wordlists: exactly 2048 distinct words, accents stripped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use unicode_general_category::{GeneralCategory, get_general_category};
use unicode_normalization::UnicodeNormalization;

pub const WORDLIST_SIZE: usize = 2048;

pub const DEFAULT_WORDLIST_PATH: &str = "/usr/share/dict/bip39/french.txt";

/// Characters of a word embedded into a password in place of a block.
pub const FRAGMENT_LEN: usize = 4;

#[derive(Error, Debug)]
pub enum WordlistError {
    #[error("Failed to read wordlist {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Wordlist must contain exactly 2048 words, found {found}")]
    WrongLength { found: usize },
    #[error("Wordlist line {line} is empty")]
    EmptyWord { line: usize },
    #[error("Wordlist line {line} repeats \"{word}\" from line {first}")]
    DuplicateWord {
        word: String,
        line: usize,
        first: usize,
    },
}

/// An immutable list of [`WORDLIST_SIZE`] normalized words.
#[derive(Debug, Clone)]
pub struct Wordlist {
    words: Vec<String>,
}

impl Wordlist {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WordlistError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| WordlistError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let wordlist = Self::from_text(&text)?;
        tracing::debug!(path = %path.display(), "wordlist loaded");
        Ok(wordlist)
    }

    /// Parses one word per line. Line terminators (`\n` or `\r\n`) are dropped.
    pub fn from_text(text: &str) -> Result<Self, WordlistError> {
        let words: Vec<String> = text.lines().map(strip_diacritics).collect();

        if words.len() != WORDLIST_SIZE {
            return Err(WordlistError::WrongLength { found: words.len() });
        }

        let mut first_seen: HashMap<&str, usize> = HashMap::with_capacity(WORDLIST_SIZE);
        for (i, word) in words.iter().enumerate() {
            let line = i + 1;
            if word.is_empty() {
                return Err(WordlistError::EmptyWord { line });
            }
            if let Some(first) = first_seen.insert(word.as_str(), line) {
                return Err(WordlistError::DuplicateWord {
                    word: word.clone(),
                    line,
                    first,
                });
            }
        }

        Ok(Self { words })
    }

    pub fn word(&self, index: usize) -> &str {
        &self.words[index]
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

/// Canonical decomposition followed by removal of nonspacing marks (Mn).
///
/// Spacing (Mc) and enclosing (Me) marks are kept.
pub fn strip_diacritics(s: &str) -> String {
    s.nfd()
        .filter(|c| get_general_category(*c) != GeneralCategory::NonspacingMark)
        .collect()
}

/// Leading [`FRAGMENT_LEN`] characters of `word` (the whole word if shorter).
pub fn fragment(word: &str) -> &str {
    match word.char_indices().nth(FRAGMENT_LEN) {
        Some((end, _)) => &word[..end],
        None => word,
    }
}

#[cfg(test)]
pub(crate) fn synthetic_text() -> String {
    // "waaaword", "waabword", ...: 2048 words with distinct fragments.
    (0..WORDLIST_SIZE)
        .map(|i| {
            let letters: String = [i / 676 % 26, i / 26 % 26, i % 26]
                .iter()
                .map(|n| (b'a' + *n as u8) as char)
                .collect();
            format!("w{}word", letters)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
