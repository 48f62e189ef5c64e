use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::time::Instant;

/// Surface that displays the current mouth image.
pub trait DisplaySink: Send {
    fn show(&mut self, image: &str);
}

/// One image write observed by a [`FrameLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub at: Instant,
    pub image: String,
}

/// Sink that records every write; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct FrameLog {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl FrameLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn images(&self) -> Vec<String> {
        self.frames().into_iter().map(|frame| frame.image).collect()
    }

    pub fn last_image(&self) -> Option<String> {
        self.frames().pop().map(|frame| frame.image)
    }

    pub fn len(&self) -> usize {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl DisplaySink for FrameLog {
    fn show(&mut self, image: &str) {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Frame {
                at: Instant::now(),
                image: image.to_string(),
            });
    }
}

/// Writes `+<elapsed ms>\t<image>` lines to a writer (stdout by default).
pub struct PrintSink<W = std::io::Stdout> {
    started: Instant,
    out: W,
}

impl PrintSink {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> PrintSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            started: Instant::now(),
            out,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> DisplaySink for PrintSink<W> {
    fn show(&mut self, image: &str) {
        let elapsed = self.started.elapsed().as_millis();
        if let Err(err) = writeln!(self.out, "+{elapsed}\t{image}") {
            tracing::warn!(error = %err, "failed to write viseme frame");
        }
    }
}
