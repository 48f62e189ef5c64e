//! Phoneme to mouth-shape ("viseme") animation.
//!
//! [`PhonemeVisemeMapper`] turns phonetic tokens into a timed sequence of
//! mouth images written to a [`DisplaySink`], and estimates how long a token
//! sequence takes to say. Lookups are total: unknown symbols show the rest
//! image and cost [`DEFAULT_DURATION_MS`].

pub mod decompose;
pub mod sink;
pub mod tables;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub use decompose::{decompose, phonetic_runs};
pub use sink::{DisplaySink, Frame, FrameLog, PrintSink};
pub use tables::{
    DiphthongTable, DurationTable, MatchOrder, VisemeTable, VisemeTables, DEFAULT_DURATION_MS,
    REST_IMAGE,
};

/// Folder the default mouth images are served from.
pub const DEFAULT_IMAGE_BASE: &str = "/static/assets/mouths/HunanBeanCMU39/";

/// Total time budget per token when the caller does not give one.
pub const DEFAULT_PLAY_MS: u64 = 300;

/// Shortest time any single mouth shape stays on screen.
pub const MIN_SYMBOL_HOLD_MS: u64 = 150;

/// How an animation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Completed,
    Cancelled,
}

/// Maps phoneme tokens to mouth images and animates them on a sink.
///
/// Only one animation runs per mapper: starting [`play`](Self::play) cancels
/// the animation in flight and waits for it to hand the sink back before
/// drawing anything.
pub struct PhonemeVisemeMapper<S> {
    sink: Mutex<S>,
    tables: Arc<VisemeTables>,
    image_base: String,
    active: Mutex<CancellationToken>,
    playback: tokio::sync::Mutex<()>,
}

impl<S: DisplaySink> PhonemeVisemeMapper<S> {
    /// Creates a mapper and immediately shows the rest image on `sink`.
    ///
    /// `tables` falls back to the bundled defaults when `None`.
    pub fn new(sink: S, tables: Option<Arc<VisemeTables>>, image_base: impl Into<String>) -> Self {
        let mapper = Self {
            sink: Mutex::new(sink),
            tables: tables.unwrap_or_else(VisemeTables::shared),
            image_base: image_base.into(),
            active: Mutex::new(CancellationToken::new()),
            playback: tokio::sync::Mutex::new(()),
        };
        mapper.rest();
        mapper
    }

    /// Mapper over the bundled tables and image folder.
    pub fn with_defaults(sink: S) -> Self {
        Self::new(sink, None, DEFAULT_IMAGE_BASE)
    }

    pub fn tables(&self) -> &Arc<VisemeTables> {
        &self.tables
    }

    pub fn image_base(&self) -> &str {
        &self.image_base
    }

    /// Full identifier written to the sink for `image`.
    pub fn image_path(&self, image: &str) -> String {
        format!("{}/{}", self.image_base.trim_end_matches('/'), image)
    }

    /// Splits one token into displayable symbols.
    pub fn decompose(&self, token: &str) -> Vec<String> {
        let symbols = decompose(&self.tables.diphthongs, token);
        debug!(token, ?symbols, "decomposed phoneme token");
        symbols
    }

    /// Estimated spoken duration of `tokens` in milliseconds.
    pub fn estimate_duration<T: AsRef<str>>(&self, tokens: &[T]) -> u64 {
        self.tables.estimate_duration(tokens)
    }

    /// Shows the rest image.
    pub fn rest(&self) {
        self.show(REST_IMAGE);
    }

    /// Animates `tokens`, giving each token `total_duration_ms` spread over its
    /// symbols with a floor of [`MIN_SYMBOL_HOLD_MS`] per symbol.
    ///
    /// The sink always ends on the rest image, including for empty input and
    /// when the animation is cancelled.
    pub async fn play<T: AsRef<str>>(&self, tokens: &[T], total_duration_ms: u64) -> PlaybackOutcome {
        let cancel = self.supersede();
        let _playback = self.playback.lock().await;
        if cancel.is_cancelled() {
            debug!("animation superseded before it started");
            return PlaybackOutcome::Cancelled;
        }

        for token in tokens {
            let symbols = self.decompose(token.as_ref());
            let hold = symbol_hold(total_duration_ms, symbols.len());
            for symbol in &symbols {
                self.show(self.tables.visemes.image_for(symbol));
                tokio::select! {
                    _ = tokio::time::sleep(hold) => {}
                    _ = cancel.cancelled() => {
                        info!(token = token.as_ref(), "viseme animation cancelled");
                        self.rest();
                        return PlaybackOutcome::Cancelled;
                    }
                }
            }
        }

        self.rest();
        PlaybackOutcome::Completed
    }

    /// Plays `tokens` over their estimated duration scaled by `factor`.
    pub async fn play_stretched<T: AsRef<str>>(&self, tokens: &[T], factor: f64) -> PlaybackOutcome {
        let estimate = self.estimate_duration(tokens) as f64;
        let total = (estimate * factor.max(0.0)).round() as u64;
        self.play(tokens, total).await
    }

    /// Stops the animation in flight, if any.
    pub fn cancel(&self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }

    fn supersede(&self) -> CancellationToken {
        let fresh = CancellationToken::new();
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *active, fresh.clone());
        previous.cancel();
        fresh
    }

    fn show(&self, image: &str) {
        let path = self.image_path(image);
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .show(&path);
    }
}

fn symbol_hold(total_duration_ms: u64, symbol_count: usize) -> Duration {
    let share = total_duration_ms as f64 / symbol_count.max(1) as f64;
    let millis = share.max(MIN_SYMBOL_HOLD_MS as f64);
    Duration::from_micros((millis * 1000.0).round() as u64)
}
