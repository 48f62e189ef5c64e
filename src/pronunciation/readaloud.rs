use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::pronunciation::viseme::{DisplaySink, PhonemeVisemeMapper, VisemeTables, DEFAULT_PLAY_MS};
use crate::pronunciation::{PhonemeTranscript, PronunciationError, Result};

/// Pause between consecutive words of a read-aloud.
pub const WORD_GAP_MS: u64 = 300;

/// Speaking rate requested from the synthesizer (1.0 is normal speed).
pub const DEFAULT_SPEAKING_RATE: f64 = 0.7;

/// Speech source that says one word and resolves when it has finished.
pub trait Speaker: Sync {
    fn speak(&self, word: &str, phonemes: &str) -> impl Future<Output = ()> + Send;
}

/// Speaker that stands in for a synthesizer by waiting out the estimated
/// duration of the word at the configured rate.
#[derive(Debug, Clone)]
pub struct PacedSpeaker {
    tables: Arc<VisemeTables>,
    rate: f64,
}

impl PacedSpeaker {
    pub fn new(tables: Arc<VisemeTables>, rate: f64) -> Result<Self> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(PronunciationError::new(format!(
                "speaking rate must be positive, got {rate}"
            )));
        }
        Ok(Self { tables, rate })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Time this speaker spends on a word with the given phonemes.
    pub fn utterance_duration(&self, phonemes: &str) -> Duration {
        let estimate = self.tables.estimate_duration(&[phonemes]) as f64;
        Duration::from_micros((estimate / self.rate * 1000.0).round() as u64)
    }
}

impl Speaker for PacedSpeaker {
    fn speak(&self, word: &str, phonemes: &str) -> impl Future<Output = ()> + Send {
        let duration = self.utterance_duration(phonemes);
        info!(word, phonemes, duration_ms = duration.as_millis() as u64, "speaking word");
        tokio::time::sleep(duration)
    }
}

/// Reads `transcript` word by word, animating each word's phonemes while
/// `speaker` says it.
///
/// Words are strictly sequential: the next word starts only after both the
/// speech and the animation of the previous one have finished and the
/// [`WORD_GAP_MS`] pause has elapsed. Returns the number of words read.
pub async fn read_aloud<S, K>(
    mapper: &PhonemeVisemeMapper<S>,
    speaker: &K,
    transcript: &PhonemeTranscript,
) -> Result<usize>
where
    S: DisplaySink,
    K: Speaker,
{
    let pairs = transcript.pairs().map_err(|err| {
        warn!(error = %err, "refusing to read transcript");
        err
    })?;

    for (word, phonemes) in &pairs {
        tokio::join!(
            speaker.speak(word, phonemes),
            mapper.play(std::slice::from_ref(phonemes), DEFAULT_PLAY_MS)
        );
        mapper.rest();
        tokio::time::sleep(Duration::from_millis(WORD_GAP_MS)).await;
    }

    info!(words = pairs.len(), "read-aloud finished");
    Ok(pairs.len())
}
