use crate::pronunciation::report::{PronunciationReport, WordError};
use crate::pronunciation::{PronunciationError, Result};

const MAX_PHONEME_DISTANCE: f64 = 5000.0;
const MAX_WORD_DISTANCE: f64 = 30.0;
const ENERGY_DEVIATION_DIVISOR: f64 = 10.0;
const IDEAL_PITCH_DEVIATION: f64 = 50.0;
const DEFAULT_FLUENCY: u32 = 85;
const DEFAULT_PROSODY: u32 = 75;
const EDIT_PENALTY: f64 = 20.0;
const CHART_ROW_PX: u32 = 10;
const CHART_MAX_HEIGHT_PX: u32 = 250;

/// How the front end should present an analysis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// The report carries no comparison; show the error view.
    Invalid,
    /// Every word matched.
    Success,
    /// At least one word needs practice.
    NeedsWork,
}

/// Scores displayed for a recording, each on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreCard {
    pub overall: u32,
    pub accuracy: u32,
    pub fluency: u32,
    pub completeness: u32,
    pub prosody: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordStatus {
    Correct,
    Missing {
        expected: String,
    },
    Mispronounced {
        expected: String,
        actual: String,
        heard: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordScore {
    pub word: String,
    pub score: u32,
    pub status: WordStatus,
}

#[derive(Debug, Default)]
pub struct MetricCalculator {}

impl MetricCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&self, report: &PronunciationReport) -> AnalysisOutcome {
        match &report.differences {
            None => AnalysisOutcome::Invalid,
            Some(differences) if differences.errors.is_empty() => AnalysisOutcome::Success,
            Some(_) => AnalysisOutcome::NeedsWork,
        }
    }

    pub fn score(&self, report: &PronunciationReport) -> Result<ScoreCard> {
        let differences = report
            .differences
            .as_ref()
            .ok_or_else(|| PronunciationError::new("report carries no differences to score"))?;
        let prosody = report.prosody.as_ref();
        Ok(ScoreCard {
            overall: clamp_score(round_half_up(report.score)),
            accuracy: distance_score(differences.phoneme_distance, MAX_PHONEME_DISTANCE),
            fluency: fluency_score(prosody.and_then(|p| p.energy.as_deref())),
            completeness: distance_score(differences.word_distance, MAX_WORD_DISTANCE),
            prosody: prosody_score(prosody.and_then(|p| p.f0.as_deref())),
        })
    }

    /// Scores every word of `expected_text` against the report's word errors.
    pub fn word_scores(&self, report: &PronunciationReport, expected_text: &str) -> Vec<WordScore> {
        let errors = report.errors();
        text_words(expected_text)
            .into_iter()
            .map(|word| {
                let error = errors.iter().find(|error| error.word == word);
                word_score(word, error)
            })
            .collect()
    }

    /// Errors worth showing as practice cards.
    pub fn error_cards<'report>(&self, report: &'report PronunciationReport) -> Vec<&'report WordError> {
        report
            .errors()
            .iter()
            .filter(|error| !error.expected.is_empty() && !error.word.is_empty())
            .collect()
    }
}

fn word_score(word: &str, error: Option<&WordError>) -> WordScore {
    let (score, status) = match error {
        None => (100, WordStatus::Correct),
        Some(error) if error.is_missing() => (
            0,
            WordStatus::Missing {
                expected: error.expected.clone(),
            },
        ),
        Some(error) => {
            let edits = levenshtein(&error.expected, &error.actual) as f64;
            (
                clamp_score(100.0 - edits * EDIT_PENALTY),
                WordStatus::Mispronounced {
                    expected: error.expected.clone(),
                    actual: error.actual.clone(),
                    heard: error.actual_word.clone(),
                },
            )
        }
    };
    WordScore {
        word: word.to_string(),
        score,
        status,
    }
}

fn distance_score(distance: f64, max_distance: f64) -> u32 {
    clamp_score(round_half_up(100.0 - distance / max_distance * 100.0))
}

fn fluency_score(energy: Option<&[f64]>) -> u32 {
    match energy.and_then(standard_deviation) {
        Some(deviation) => clamp_score(round_half_up(100.0 - deviation / ENERGY_DEVIATION_DIVISOR)),
        None => DEFAULT_FLUENCY,
    }
}

fn prosody_score(f0: Option<&[f64]>) -> u32 {
    match f0.and_then(standard_deviation) {
        Some(deviation) => {
            clamp_score(round_half_up(100.0 - (deviation - IDEAL_PITCH_DEVIATION).abs()))
        }
        None => DEFAULT_PROSODY,
    }
}

/// Population standard deviation, `None` for an empty series.
pub fn standard_deviation(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let squares = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>();
    Some((squares / count).sqrt())
}

/// Character-level edit distance.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, &left) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &right) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(left != right);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Words of a sentence: runs of ASCII word characters and apostrophes,
/// without leading or trailing apostrophes.
pub fn text_words(text: &str) -> Vec<&str> {
    text.split(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '\''))
        .map(|run| run.trim_matches('\''))
        .filter(|word| !word.is_empty())
        .collect()
}

/// Pixel height of the phoneme comparison chart.
pub fn chart_height_px(expected_points: usize) -> u32 {
    let rows = u32::try_from(expected_points).unwrap_or(u32::MAX);
    rows.saturating_mul(CHART_ROW_PX).min(CHART_MAX_HEIGHT_PX)
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn clamp_score(value: f64) -> u32 {
    value.clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_counts_edits() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("juː", "juː"), 0);
        assert_eq!(levenshtein("haʊ", "dɔːʊɡ"), 4);
    }

    #[test]
    fn words_drop_punctuation() {
        assert_eq!(
            text_words("Hello, how are you? I'm 'fine'."),
            vec!["Hello", "how", "are", "you", "I'm", "fine"]
        );
        assert!(text_words("...").is_empty());
    }

    #[test]
    fn deviation_of_constant_series_is_zero() {
        assert_eq!(standard_deviation(&[3.0, 3.0, 3.0]), Some(0.0));
        assert_eq!(standard_deviation(&[]), None);
        assert_eq!(standard_deviation(&[1.0, 3.0]), Some(1.0));
    }

    #[test]
    fn chart_height_is_capped() {
        assert_eq!(chart_height_px(17), 170);
        assert_eq!(chart_height_px(40), 250);
        assert_eq!(chart_height_px(0), 0);
    }
}
