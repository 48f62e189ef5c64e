use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use visemer::audio::silence::{find_stop_point, MonitorDecision, SilenceMonitor, MAX_RECORDING_MS};
use visemer::audio::wav::read_wav;
use visemer::pronunciation::cli::{Cli, Command, PlayArgs, ReadArgs, ScoreArgs, SilenceArgs, TokenArgs};
use visemer::pronunciation::metrics::{chart_height_px, AnalysisOutcome, MetricCalculator, WordStatus};
use visemer::pronunciation::readaloud::{read_aloud, PacedSpeaker};
use visemer::pronunciation::report::PronunciationReport;
use visemer::pronunciation::viseme::{
    decompose, PhonemeVisemeMapper, PlaybackOutcome, PrintSink, VisemeTables,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("visemer=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let tables = cli
        .table_source()
        .load()
        .context("Failed to load viseme tables")?;

    match &cli.command {
        Command::Decompose(args) => handle_decompose(tables, args),
        Command::Estimate(args) => handle_estimate(tables, args),
        Command::Play(args) => handle_play(&cli, tables, args).await,
        Command::Read(args) => handle_read(&cli, tables, args).await,
        Command::Score(args) => handle_score(args),
        Command::Silence(args) => handle_silence(args),
    }
}

fn handle_decompose(tables: Arc<VisemeTables>, args: &TokenArgs) -> Result<()> {
    for token in &args.tokens {
        println!("{}\t{}", token, decompose(&tables.diphthongs, token).join(" "));
    }
    Ok(())
}

fn handle_estimate(tables: Arc<VisemeTables>, args: &TokenArgs) -> Result<()> {
    println!("{}", tables.estimate_duration(args.tokens.as_slice()));
    Ok(())
}

async fn handle_play(cli: &Cli, tables: Arc<VisemeTables>, args: &PlayArgs) -> Result<()> {
    args.validate()?;
    let mapper = PhonemeVisemeMapper::new(PrintSink::stdout(), Some(tables), cli.image_base.clone());
    let tokens = args.tokens.tokens.as_slice();
    let outcome = match args.stretch {
        Some(factor) => mapper.play_stretched(tokens, factor).await,
        None => mapper.play(tokens, args.duration).await,
    };
    if outcome == PlaybackOutcome::Cancelled {
        eprintln!("Animation was cancelled");
    }
    Ok(())
}

async fn handle_read(cli: &Cli, tables: Arc<VisemeTables>, args: &ReadArgs) -> Result<()> {
    let transcript = args.transcript()?;
    let speaker = PacedSpeaker::new(Arc::clone(&tables), args.rate)?;
    let mapper = PhonemeVisemeMapper::new(PrintSink::stdout(), Some(tables), cli.image_base.clone());
    let words = read_aloud(&mapper, &speaker, &transcript)
        .await
        .context("Failed to read sentence aloud")?;
    eprintln!("Read {} words", words);
    Ok(())
}

fn handle_score(args: &ScoreArgs) -> Result<()> {
    let report = PronunciationReport::from_path(&args.report)
        .with_context(|| format!("Failed to load report {:?}", args.report))?;
    let metrics = MetricCalculator::new();

    match metrics.classify(&report) {
        AnalysisOutcome::Invalid => anyhow::bail!("Report contains no differences to score"),
        AnalysisOutcome::Success => println!("result: no errors"),
        AnalysisOutcome::NeedsWork => println!("result: needs work"),
    }

    let card = metrics.score(&report)?;
    println!("overall: {}", card.overall);
    println!("accuracy: {}/100", card.accuracy);
    println!("fluency: {}/100", card.fluency);
    println!("completeness: {}/100", card.completeness);
    println!("prosody: {}/100", card.prosody);
    if let Some(transcribed) = &report.transcribe {
        println!("heard: {}", transcribed);
    }
    if let Some(differences) = &report.differences {
        if !differences.expected_vector.is_empty() {
            println!(
                "chart height: {}px",
                chart_height_px(differences.expected_vector.len())
            );
        }
    }

    for word in metrics.word_scores(&report, &args.text) {
        let detail = match &word.status {
            WordStatus::Correct => "Correct".to_string(),
            WordStatus::Missing { expected } => format!("/{}/ vs (missing)", expected),
            WordStatus::Mispronounced {
                expected,
                actual,
                heard,
            } => match heard {
                Some(heard) => format!("/{}/ vs /{}/ (Heard: \"{}\")", expected, actual, heard),
                None => format!("/{}/ vs /{}/", expected, actual),
            },
        };
        println!("{}\t{}\t{}", word.word, word.score, detail);
    }
    Ok(())
}

fn handle_silence(args: &SilenceArgs) -> Result<()> {
    args.validate()?;
    let audio = read_wav(&args.wav)?;
    let mut monitor = SilenceMonitor::new(args.threshold, args.silence_ms, MAX_RECORDING_MS);
    match find_stop_point(&audio, args.window_ms, &mut monitor) {
        Some(stop) => {
            let reason = match stop.decision {
                MonitorDecision::StopForLimit => "recording limit",
                _ => "silence",
            };
            println!("stop at {:.3}s ({})", stop.at_seconds, reason);
        }
        None => println!("no stop"),
    }
    Ok(())
}
