use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use visemer::pronunciation::readaloud::{read_aloud, PacedSpeaker, Speaker};
use visemer::pronunciation::report::PhonemeTranscript;
use visemer::pronunciation::viseme::{FrameLog, PhonemeVisemeMapper, VisemeTables};

struct RecordingSpeaker {
    started: Instant,
    spoken: Mutex<Vec<(String, Duration)>>,
    utterance: Duration,
}

impl RecordingSpeaker {
    fn new(utterance_ms: u64) -> Self {
        Self {
            started: Instant::now(),
            spoken: Mutex::new(Vec::new()),
            utterance: Duration::from_millis(utterance_ms),
        }
    }

    fn spoken(&self) -> Vec<(String, Duration)> {
        self.spoken.lock().unwrap().clone()
    }
}

impl Speaker for RecordingSpeaker {
    fn speak(&self, word: &str, _phonemes: &str) -> impl Future<Output = ()> + Send {
        self.spoken
            .lock()
            .unwrap()
            .push((word.to_string(), self.started.elapsed()));
        tokio::time::sleep(self.utterance)
    }
}

fn transcript(words: &[&str], phonemes: &[&str]) -> PhonemeTranscript {
    PhonemeTranscript::new(
        words.iter().map(|w| w.to_string()).collect(),
        phonemes.iter().map(|p| p.to_string()).collect(),
    )
}

fn within_a_tick(actual: Duration, expected_ms: u64) -> bool {
    let expected = Duration::from_millis(expected_ms);
    actual.max(expected) - actual.min(expected) <= Duration::from_millis(1)
}

#[tokio::test(start_paused = true)]
async fn words_are_read_one_after_another() {
    let log = FrameLog::new();
    let mapper = PhonemeVisemeMapper::new(log.clone(), None, "m");
    log.clear();
    let speaker = RecordingSpeaker::new(100);
    let start = Instant::now();

    let read = read_aloud(&mapper, &speaker, &transcript(&["how", "you"], &["haʊ", "juː"]))
        .await
        .unwrap();

    assert_eq!(read, 2);
    assert_eq!(
        log.images(),
        vec![
            "m/rest.png",
            "m/UH.png",
            "m/rest.png",
            "m/rest.png",
            "m/Y.png",
            "m/UW.png",
            "m/rest.png",
            "m/rest.png",
        ]
    );

    // each word animates for 300ms, then a 300ms gap
    let spoken = speaker.spoken();
    assert_eq!(spoken.len(), 2);
    assert_eq!(spoken[0].0, "how");
    assert!(within_a_tick(spoken[0].1, 0));
    assert_eq!(spoken[1].0, "you");
    assert!(within_a_tick(spoken[1].1, 600));
    assert!(within_a_tick(start.elapsed(), 1200));
}

#[tokio::test(start_paused = true)]
async fn slow_speech_holds_the_next_word() {
    let log = FrameLog::new();
    let mapper = PhonemeVisemeMapper::new(log.clone(), None, "m");
    let speaker = RecordingSpeaker::new(1000);

    read_aloud(&mapper, &speaker, &transcript(&["a", "b"], &["ə", "b"]))
        .await
        .unwrap();

    let spoken = speaker.spoken();
    assert!(within_a_tick(spoken[1].1, 1300));
    assert_eq!(log.last_image().as_deref(), Some("m/rest.png"));
}

#[tokio::test(start_paused = true)]
async fn mismatched_transcript_reads_nothing() {
    let log = FrameLog::new();
    let mapper = PhonemeVisemeMapper::new(log.clone(), None, "m");
    log.clear();
    let speaker = RecordingSpeaker::new(100);

    let error = read_aloud(&mapper, &speaker, &transcript(&["how", "are"], &["haʊ"]))
        .await
        .unwrap_err();

    assert!(error.to_string().contains("2 words but 1 phoneme groups"));
    assert!(log.is_empty());
    assert!(speaker.spoken().is_empty());
}

#[tokio::test(start_paused = true)]
async fn paced_speaker_slows_down_with_rate() {
    let mapper = PhonemeVisemeMapper::new(FrameLog::new(), None, "m");
    let speaker = PacedSpeaker::new(VisemeTables::shared(), 0.5).unwrap();
    let start = Instant::now();

    read_aloud(&mapper, &speaker, &transcript(&["you"], &["juː"]))
        .await
        .unwrap();

    // 280ms estimate at half speed, then the inter-word gap
    assert!(within_a_tick(start.elapsed(), 560 + 300));
}
