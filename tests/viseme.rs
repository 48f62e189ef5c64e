use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use visemer::pronunciation::viseme::{
    FrameLog, MatchOrder, PhonemeVisemeMapper, PlaybackOutcome, VisemeTables,
};

const BASE: &str = "mouths";

fn quiet_mapper() -> (PhonemeVisemeMapper<FrameLog>, FrameLog) {
    let log = FrameLog::new();
    let mapper = PhonemeVisemeMapper::new(log.clone(), None, BASE);
    log.clear();
    (mapper, log)
}

fn image(name: &str) -> String {
    format!("{BASE}/{name}")
}

fn assert_offsets(log: &FrameLog, start: Instant, expected_ms: &[u64]) {
    let frames = log.frames();
    assert_eq!(frames.len(), expected_ms.len(), "frame count");
    for (frame, &expected) in frames.iter().zip(expected_ms) {
        let actual = frame.at.duration_since(start);
        let expected = Duration::from_millis(expected);
        let drift = actual.max(expected) - actual.min(expected);
        assert!(
            drift <= Duration::from_millis(1),
            "{} shown at {:?}, expected {:?}",
            frame.image,
            actual,
            expected
        );
    }
}

#[test]
fn exact_diphthongs_decompose_to_their_constituents() {
    let (mapper, _) = quiet_mapper();
    let tables = VisemeTables::shared();
    for (cluster, phonemes) in tables.diphthongs.iter() {
        assert_eq!(mapper.decompose(cluster), phonemes, "cluster {cluster}");
        assert_eq!(
            mapper.decompose(cluster).join(" "),
            phonemes.join(" "),
            "round trip for {cluster}"
        );
    }
}

#[test]
fn tokens_outside_the_alphabet_come_back_unchanged() {
    let (mapper, _) = quiet_mapper();
    for token in ["123", "?!", "ÆØ", "  "] {
        assert_eq!(mapper.decompose(token), vec![token.to_string()]);
    }
    assert_eq!(mapper.decompose(""), vec![String::new()]);
}

#[test]
fn match_order_policy_breaks_ties_between_embedded_clusters() {
    let longest = PhonemeVisemeMapper::new(FrameLog::new(), None, BASE);
    assert_eq!(longest.decompose("xjuːaʊ"), vec!["xj", "uaʊ"]);

    let declared_tables = (*VisemeTables::shared())
        .clone()
        .with_match_order(MatchOrder::Declared);
    let declared = PhonemeVisemeMapper::new(FrameLog::new(), Some(Arc::new(declared_tables)), BASE);
    assert_eq!(declared.decompose("xjuːaʊ"), vec!["xjuːa", "ʊ"]);
}

#[test]
fn duration_estimates() {
    let (mapper, _) = quiet_mapper();
    assert_eq!(mapper.estimate_duration::<&str>(&[]), 0);
    assert_eq!(mapper.estimate_duration(&["b"]), 100);
    assert_eq!(mapper.estimate_duration(&["x"]), 200);
    assert_eq!(mapper.estimate_duration(&["juː"]), 280);
    assert_eq!(mapper.estimate_duration(&["oʊ"]), 250);
    assert_eq!(mapper.estimate_duration(&["həloʊ", "b"]), 80 + 100 + 130 + 250 + 100);
}

#[tokio::test(start_paused = true)]
async fn single_symbol_holds_for_the_full_budget() {
    let (mapper, log) = quiet_mapper();
    let start = Instant::now();

    let outcome = mapper.play(&["b"], 300).await;

    assert_eq!(outcome, PlaybackOutcome::Completed);
    assert_eq!(log.images(), vec![image("B.png"), image("rest.png")]);
    assert_offsets(&log, start, &[0, 300]);
}

#[tokio::test(start_paused = true)]
async fn empty_input_only_resets() {
    let (mapper, log) = quiet_mapper();
    let outcome = mapper.play::<&str>(&[], 900).await;
    assert_eq!(outcome, PlaybackOutcome::Completed);
    assert_eq!(log.images(), vec![image("rest.png")]);
}

#[tokio::test(start_paused = true)]
async fn hold_is_recomputed_per_token() {
    let (mapper, log) = quiet_mapper();
    let start = Instant::now();

    mapper.play(&["juː", "b"], 300).await;

    assert_eq!(
        log.images(),
        vec![image("Y.png"), image("UW.png"), image("B.png"), image("rest.png")]
    );
    assert_offsets(&log, start, &[0, 150, 300, 600]);
}

#[tokio::test(start_paused = true)]
async fn unknown_symbols_show_rest() {
    let (mapper, log) = quiet_mapper();
    mapper.play(&["həloʊ"], 300).await;
    assert_eq!(
        log.images(),
        vec![
            image("H.png"),
            image("AH.png"),
            image("L.png"),
            image("rest.png"),
            image("rest.png"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn stretched_playback_uses_the_estimate() {
    let (mapper, log) = quiet_mapper();
    let start = Instant::now();

    mapper.play_stretched(&["juː"], 1.5).await;

    assert_offsets(&log, start, &[0, 210, 420]);
}

#[tokio::test(start_paused = true)]
async fn new_playback_supersedes_the_running_one() {
    let log = FrameLog::new();
    let mapper = Arc::new(PhonemeVisemeMapper::new(log.clone(), None, BASE));
    log.clear();
    let start = Instant::now();

    let first = {
        let mapper = Arc::clone(&mapper);
        tokio::spawn(async move { mapper.play(&["həloʊ"], 1000).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = mapper.play(&["b"], 300).await;

    assert_eq!(first.await.unwrap(), PlaybackOutcome::Cancelled);
    assert_eq!(second, PlaybackOutcome::Completed);
    assert_eq!(
        log.images(),
        vec![image("H.png"), image("rest.png"), image("B.png"), image("rest.png")]
    );
    assert_offsets(&log, start, &[0, 100, 100, 400]);
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_and_rests() {
    let log = FrameLog::new();
    let mapper = Arc::new(PhonemeVisemeMapper::new(log.clone(), None, BASE));
    log.clear();

    let running = {
        let mapper = Arc::clone(&mapper);
        tokio::spawn(async move { mapper.play(&["juː", "b"], 1000).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    mapper.cancel();

    assert_eq!(running.await.unwrap(), PlaybackOutcome::Cancelled);
    assert_eq!(log.images(), vec![image("Y.png"), image("rest.png")]);
}

#[tokio::test(start_paused = true)]
async fn cancel_without_playback_is_harmless() {
    let (mapper, log) = quiet_mapper();
    mapper.cancel();
    assert_eq!(mapper.play(&["b"], 300).await, PlaybackOutcome::Completed);
    assert_eq!(log.len(), 2);
}
