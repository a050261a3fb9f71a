//! Lexicon matcher flagging sentences that contain badlisted words.
//!
//! A lexicon holds one entry per line. Blank lines and lines starting with `#` are ignored.
//! An entry ending in `*` matches any word starting with the stem (`fuck*` matches "fucks"
//! and "fucked"); other entries match whole words only. Matching is case-insensitive.

use crate::downstream::{Annotator, types::DownstreamError};
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use std::path::Path;
use thiserror::Error;

const DEFAULT_LEXICON: &str = include_str!("../../data/badlisted_words.txt");

/// Errors raised while loading a lexicon.
#[derive(Debug, Error)]
pub enum LexiconError {
    /// Lexicon file could not be read.
    #[error("Failed to read lexicon {path}: {source}")]
    Io {
        /// Path that was attempted.
        path: String,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// Lexicon contained no usable entries.
    #[error("Lexicon contains no entries")]
    Empty,
    /// Compiled pattern exceeded regex limits.
    #[error("Failed to compile lexicon: {0}")]
    Pattern(#[from] regex::Error),
}

/// In-process detector backed by a compiled lexicon pattern.
#[derive(Debug, Clone)]
pub struct BadlistDetector {
    pattern: Regex,
    entries: usize,
}

impl BadlistDetector {
    /// Build a detector from lexicon text.
    pub fn from_lexicon(lexicon: &str) -> Result<Self, LexiconError> {
        let alternatives: Vec<String> = lexicon
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(entry_pattern)
            .collect();

        if alternatives.is_empty() {
            return Err(LexiconError::Empty);
        }

        let pattern = RegexBuilder::new(&format!(r"\b(?:{})", alternatives.join("|")))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            pattern,
            entries: alternatives.len(),
        })
    }

    /// Load a detector from a lexicon file.
    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let lexicon = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let detector = Self::from_lexicon(&lexicon)?;
        tracing::info!(
            path = %path.display(),
            entries = detector.entries,
            "Loaded badlist lexicon"
        );
        Ok(detector)
    }

    /// Detector backed by the lexicon bundled with the crate.
    pub fn builtin() -> Result<Self, LexiconError> {
        Self::from_lexicon(DEFAULT_LEXICON)
    }

    /// Number of entries in the compiled lexicon.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Whether `text` contains a badlisted word.
    pub fn is_flagged(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

fn entry_pattern(entry: &str) -> Option<String> {
    match entry.strip_suffix('*') {
        Some(stem) => {
            let stem = stem.trim();
            (!stem.is_empty()).then(|| format!(r"{}\w*\b", regex::escape(stem)))
        }
        None => Some(format!(r"{}\b", regex::escape(entry))),
    }
}

#[async_trait]
impl Annotator for BadlistDetector {
    type Item = String;
    type Output = bool;

    fn name(&self) -> &'static str {
        "badlisted_words"
    }

    async fn annotate(&self, item: &String) -> Result<bool, DownstreamError> {
        Ok(self.is_flagged(item))
    }

    fn fallback(&self, _item: &String) -> bool {
        false
    }
}
