//! Payloads exchanged with the remote analysis endpoints.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pronunciation::{PronunciationError, Result};

/// Response of the pronunciation scoring endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PronunciationReport {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub differences: Option<Differences>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub transcribe: Option<String>,
    #[serde(default)]
    pub prosody: Option<Prosody>,
}

/// Word- and phoneme-level comparison between expected and spoken text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Differences {
    #[serde(default)]
    pub word_distance: f64,
    #[serde(default)]
    pub phoneme_distance: f64,
    #[serde(default)]
    pub errors: Vec<WordError>,
    #[serde(default)]
    pub expected_vector: Vec<Vec<f64>>,
    #[serde(default)]
    pub transcribed_vector: Vec<Vec<f64>>,
    #[serde(default)]
    pub expected_phonemes: Vec<String>,
    #[serde(default)]
    pub transcribed_phonemes: Vec<String>,
}

/// A word whose pronunciation did not match the expected phonemes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordError {
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub expected: String,
    /// Empty when the word was not heard at all.
    #[serde(default)]
    pub actual: String,
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub actual_word: Option<String>,
}

impl WordError {
    pub fn is_missing(&self) -> bool {
        self.actual.is_empty()
    }
}

/// Pitch and energy contours of the learner recording.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prosody {
    #[serde(default)]
    pub f0: Option<Vec<f64>>,
    #[serde(default)]
    pub energy: Option<Vec<f64>>,
}

impl PronunciationReport {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| PronunciationError::new(format!("invalid pronunciation report: {err}")))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| {
            PronunciationError::new(format!("failed to open {}: {err}", path.display()))
        })?;
        serde_json::from_reader(file)
            .map_err(|err| PronunciationError::new(format!("invalid pronunciation report: {err}")))
    }

    pub fn errors(&self) -> &[WordError] {
        self.differences
            .as_ref()
            .map(|differences| differences.errors.as_slice())
            .unwrap_or(&[])
    }
}

/// Response of the phoneme extraction endpoint: one phoneme token per word.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhonemeTranscript {
    pub words: Vec<String>,
    pub phonemes: Vec<String>,
}

impl PhonemeTranscript {
    pub fn new(words: Vec<String>, phonemes: Vec<String>) -> Self {
        Self { words, phonemes }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| {
            PronunciationError::new(format!("failed to open {}: {err}", path.display()))
        })?;
        serde_json::from_reader(file)
            .map_err(|err| PronunciationError::new(format!("invalid phoneme transcript: {err}")))
    }

    /// Word/phoneme pairs, failing when the two lists do not line up.
    pub fn pairs(&self) -> Result<Vec<(String, String)>> {
        if self.words.len() != self.phonemes.len() {
            return Err(PronunciationError::new(format!(
                "{} words but {} phoneme groups",
                self.words.len(),
                self.phonemes.len()
            )));
        }
        Ok(self
            .words
            .iter()
            .cloned()
            .zip(self.phonemes.iter().cloned())
            .collect())
    }
}
