use std::path::PathBuf;

use anyhow::{bail, ensure, Result};
use clap::{Args, Parser, Subcommand};

use crate::audio::silence::{SILENCE_DURATION_MS, SILENCE_THRESHOLD};
use crate::config::TableSource;
use crate::pronunciation::readaloud::DEFAULT_SPEAKING_RATE;
use crate::pronunciation::report::PhonemeTranscript;
use crate::pronunciation::viseme::{MatchOrder, DEFAULT_IMAGE_BASE, DEFAULT_PLAY_MS};

#[derive(Parser, Debug)]
#[command(
    name = "visemer",
    version,
    about = "Phoneme to mouth-shape animation and pronunciation report utility"
)]
pub struct Cli {
    /// JSON file with viseme, diphthong and duration tables.
    #[arg(long, global = true, value_name = "PATH")]
    pub tables: Option<PathBuf>,
    /// Assets directory holding visemes/tables.json.
    #[arg(long = "assets-path", global = true, value_name = "DIR")]
    pub assets_path: Option<PathBuf>,
    /// Folder prefix for mouth image identifiers.
    #[arg(long = "image-base", global = true, default_value = DEFAULT_IMAGE_BASE)]
    pub image_base: String,
    /// Order in which embedded diphthongs are matched.
    #[arg(long = "match-order", global = true, value_enum)]
    pub match_order: Option<MatchOrder>,
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn table_source(&self) -> TableSource {
        TableSource {
            tables_file: self.tables.clone(),
            assets_root: self.assets_path.clone(),
            match_order: self.match_order,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the symbols each phoneme token animates as.
    Decompose(TokenArgs),
    /// Print the estimated spoken duration of the tokens in milliseconds.
    Estimate(TokenArgs),
    /// Animate the tokens, printing one line per mouth image.
    Play(PlayArgs),
    /// Read a sentence aloud word by word with mouth animation.
    Read(ReadArgs),
    /// Score a pronunciation report against the expected sentence.
    Score(ScoreArgs),
    /// Find where silence detection would stop a recording.
    Silence(SilenceArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TokenArgs {
    /// Phoneme tokens, e.g. "həloʊ" "juː".
    #[arg(value_name = "TOKEN", required = true)]
    pub tokens: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    #[command(flatten)]
    pub tokens: TokenArgs,
    /// Time budget per token in milliseconds.
    #[arg(long, default_value_t = DEFAULT_PLAY_MS, conflicts_with = "stretch")]
    pub duration: u64,
    /// Play over the estimated duration scaled by this factor.
    #[arg(long)]
    pub stretch: Option<f64>,
}

impl PlayArgs {
    pub fn validate(&self) -> Result<()> {
        if let Some(factor) = self.stretch {
            ensure!(
                factor.is_finite() && factor > 0.0,
                "stretch factor must be positive, got {factor}"
            );
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct ReadArgs {
    /// Words of the sentence.
    #[arg(long, num_args = 1.., requires = "phonemes", conflicts_with = "phonemes_file")]
    pub words: Vec<String>,
    /// One phoneme token per word.
    #[arg(long, num_args = 1.., requires = "words")]
    pub phonemes: Vec<String>,
    /// JSON file with `words` and `phonemes` arrays.
    #[arg(long = "phonemes-file", value_name = "PATH")]
    pub phonemes_file: Option<PathBuf>,
    /// Speaking rate, 1.0 being normal speed.
    #[arg(long, default_value_t = DEFAULT_SPEAKING_RATE)]
    pub rate: f64,
}

impl ReadArgs {
    pub fn transcript(&self) -> Result<PhonemeTranscript> {
        if let Some(path) = &self.phonemes_file {
            return Ok(PhonemeTranscript::from_path(path)?);
        }
        if self.words.is_empty() {
            bail!("provide --words and --phonemes or --phonemes-file");
        }
        Ok(PhonemeTranscript::new(
            self.words.clone(),
            self.phonemes.clone(),
        ))
    }
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    /// Pronunciation report JSON returned by the analysis service.
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,
    /// Sentence the learner was asked to say.
    #[arg(long)]
    pub text: String,
}

#[derive(Args, Debug, Clone)]
pub struct SilenceArgs {
    /// Recording to scan.
    #[arg(value_name = "WAV")]
    pub wav: PathBuf,
    /// Level (0-255) below which a frame counts as silent.
    #[arg(long, default_value_t = SILENCE_THRESHOLD)]
    pub threshold: f32,
    /// Continuous silence needed to stop, in milliseconds.
    #[arg(long = "silence-ms", default_value_t = SILENCE_DURATION_MS)]
    pub silence_ms: u64,
    /// Analysis window in milliseconds.
    #[arg(long = "window-ms", default_value_t = 20.0)]
    pub window_ms: f64,
}

impl SilenceArgs {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.window_ms > 0.0, "window must be positive");
        ensure!(
            (0.0..=255.0).contains(&self.threshold),
            "threshold must be within 0-255"
        );
        Ok(())
    }
}
