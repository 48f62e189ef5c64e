pub mod cli;
pub mod metrics;
pub mod readaloud;
pub mod report;
pub mod viseme;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub use metrics::{AnalysisOutcome, MetricCalculator, ScoreCard, WordScore, WordStatus};
pub use readaloud::{read_aloud, PacedSpeaker, Speaker};
pub use report::{Differences, PhonemeTranscript, PronunciationReport, WordError};
pub use viseme::{
    DiphthongTable, DisplaySink, DurationTable, FrameLog, MatchOrder, PhonemeVisemeMapper,
    PlaybackOutcome, PrintSink, VisemeTable, VisemeTables,
};

/// Convenient alias for results returned by pronunciation modules.
pub type Result<T> = std::result::Result<T, PronunciationError>;

/// Lightweight error type shared by the pronunciation modules.
#[derive(Debug, Clone)]
pub struct PronunciationError {
    message: Arc<str>,
}

impl PronunciationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Arc::from(message.into()),
        }
    }
}

impl Display for PronunciationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for PronunciationError {}
