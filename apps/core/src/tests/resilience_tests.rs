//! Batch behavior under failing, slow and panicking capabilities.

use super::mocks::{self, MockDetector, MockEnglish, MockMultilingual};
use crate::analysis::{BatchSummary, LanguageTag, SentimentLabel, ThemeCatalog, ThemeExtractor};
use crate::capabilities::RawSentiment;
use crate::error::CapabilityError;
use crate::models::ReviewRecord;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn reviews(texts: &[&str]) -> Vec<ReviewRecord> {
    texts
        .iter()
        .map(|t| ReviewRecord::new(Some(*t), Some(3), "2024-05-01", "CBE", "Google Play"))
        .collect()
}

/// English model that fails on texts containing `marker`.
fn english_failing_on(marker: &'static str) -> MockEnglish {
    MockEnglish::new(move |text: &str| {
        if text.contains(marker) {
            Err(CapabilityError::Request("connection reset".to_string()))
        } else {
            Ok(RawSentiment {
                label: "POSITIVE".to_string(),
                score: 0.9,
            })
        }
    })
}

#[tokio::test]
async fn test_failing_record_does_not_stop_batch() {
    let analyzer = mocks::analyzer(
        MockDetector::returning("en"),
        english_failing_on("BOOM"),
        MockMultilingual::failing(),
        mocks::fast_settings(4),
    )
    .await;

    let input = reviews(&["first review", "BOOM second", "third review", "fourth review"]);
    let output = analyzer.analyze_batch(input.clone()).await;

    assert_eq!(output.len(), input.len());
    assert_eq!(output[1].sentiment_label(), SentimentLabel::Error);
    for index in [0, 2, 3] {
        assert_eq!(output[index].sentiment_label(), SentimentLabel::Positive);
    }
    for (record, review) in output.iter().zip(&input) {
        assert_eq!(record.review(), review);
    }
}

#[tokio::test]
async fn test_panicking_capability_degrades_only_its_record() {
    let english = MockEnglish::new(|text: &str| {
        if text.contains("PANIC") {
            panic!("model runtime crashed");
        }
        Ok(RawSentiment {
            label: "NEGATIVE".to_string(),
            score: 0.8,
        })
    });
    let analyzer = mocks::analyzer(
        MockDetector::returning("en"),
        english,
        MockMultilingual::failing(),
        mocks::fast_settings(2),
    )
    .await;

    let output = analyzer
        .analyze_batch(reviews(&["slow app", "PANIC fees", "transfer stuck"]))
        .await;

    assert_eq!(output.len(), 3);
    assert_eq!(output[0].sentiment_label(), SentimentLabel::Negative);
    // The sentiment stage died, the other stages still ran
    assert_eq!(output[1].sentiment_label(), SentimentLabel::Error);
    assert_eq!(output[1].sentiment_score(), 0.0);
    assert_eq!(output[1].language(), LanguageTag::En);
    assert_eq!(output[1].themes(), &["Fees & Charges"]);
    assert_eq!(output[2].sentiment_label(), SentimentLabel::Negative);
}

#[tokio::test]
async fn test_panicking_detector_yields_unknown() {
    let detector = MockDetector::new(|text: &str| {
        if text.contains("PANIC") {
            panic!("detector crashed");
        }
        Ok("en".to_string())
    });
    let analyzer = mocks::analyzer(
        detector,
        MockEnglish::returning("POSITIVE", 0.9),
        MockMultilingual::failing(),
        mocks::fast_settings(2),
    )
    .await;

    let output = analyzer
        .analyze_batch(reviews(&["PANIC but good support", "fine"]))
        .await;

    assert_eq!(output[0].language(), LanguageTag::Unknown);
    assert_eq!(output[0].sentiment_label(), SentimentLabel::Positive);
    assert_eq!(output[0].themes(), &["Customer Support"]);
    assert_eq!(output[1].language(), LanguageTag::En);
}

#[tokio::test]
async fn test_timeouts_map_to_sentinels() {
    let slow = Duration::from_secs(5);
    let analyzer = mocks::analyzer(
        MockDetector::returning("en").with_delay(slow),
        MockEnglish::returning("POSITIVE", 0.9).with_delay(slow),
        MockMultilingual::returning(5, 0.9).with_delay(slow),
        mocks::fast_settings(2),
    )
    .await;

    let started = Instant::now();
    let output = analyzer
        .analyze_batch(reviews(&["The transfer failed again", "Customer support never helps"]))
        .await;

    assert!(started.elapsed() < Duration::from_secs(3));
    for record in &output {
        assert_eq!(record.language(), LanguageTag::Unknown);
        assert_eq!(record.sentiment_label(), SentimentLabel::Error);
        assert_eq!(record.sentiment_score(), 0.0);
        // Themes are local and unaffected
        assert!(!record.has_theme_error());
    }
}

#[tokio::test]
async fn test_theme_failure_keeps_language_and_sentiment() {
    let failing_themes = ThemeExtractor::new(Arc::new(ThemeCatalog::builtin())).with_fault(|text| {
        if text.contains("PANIC") {
            panic!("keyword scoring crashed");
        }
    });
    let analyzer = mocks::analyzer(
        MockDetector::returning("en"),
        MockEnglish::returning("POSITIVE", 0.9),
        MockMultilingual::failing(),
        mocks::fast_settings(2),
    )
    .await
    .with_theme_extractor(failing_themes);

    let output = analyzer
        .analyze_batch(reviews(&["PANIC the app is slow", "the app is slow"]))
        .await;

    assert_eq!(output[0].themes(), &["Error"]);
    assert!(output[0].has_theme_error());
    assert_eq!(output[0].language(), LanguageTag::En);
    assert_eq!(output[0].sentiment_label(), SentimentLabel::Positive);
    assert!((output[0].sentiment_score() - 0.9).abs() < 1e-6);
    assert_eq!(output[1].themes(), &["App Performance"]);

    let summary = BatchSummary::from_records(&output);
    assert_eq!(summary.theme_errors, 1);
    assert_eq!(summary.sentiment_errors, 0);
}

#[tokio::test]
async fn test_amharic_fallback_inside_batch() {
    let english = MockEnglish::returning("NEGATIVE", 0.75);
    let english_calls = english.calls();
    let analyzer = mocks::analyzer(
        MockDetector::returning("am"),
        english,
        MockMultilingual::failing(),
        mocks::fast_settings(2),
    )
    .await;

    let output = analyzer
        .analyze_batch(reviews(&["አገልግሎቱ በጣም ደካማ ነው እና ችግር አለ"]))
        .await;

    assert_eq!(output[0].language(), LanguageTag::Am);
    assert_eq!(output[0].sentiment_label(), SentimentLabel::Negative);
    assert_eq!(english_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_batch_preserves_order() {
    // Earlier records answer slower, so completion order is reversed
    let detector = MockDetector::new(|_| Ok("en".to_string()));
    let english = MockEnglish::new(|text: &str| {
        let index: u64 = text.trim_start_matches("review ").parse().unwrap_or(0);
        std::thread::sleep(Duration::from_millis(30u64.saturating_sub(index * 3)));
        Ok(RawSentiment {
            label: if index % 2 == 0 { "POSITIVE" } else { "NEGATIVE" }.to_string(),
            score: 0.9,
        })
    });
    let analyzer = mocks::analyzer(
        detector,
        english,
        MockMultilingual::failing(),
        mocks::fast_settings(8),
    )
    .await;

    let texts: Vec<String> = (0..10).map(|i| format!("review {}", i)).collect();
    let input: Vec<ReviewRecord> = texts
        .iter()
        .map(|t| ReviewRecord::new(Some(t.as_str()), None, "2024-05-01", "CBE", "Google Play"))
        .collect();

    let output = analyzer.analyze_batch(input.clone()).await;

    assert_eq!(output.len(), 10);
    for (i, record) in output.iter().enumerate() {
        assert_eq!(record.review(), &input[i]);
        let expected = if i % 2 == 0 {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        };
        assert_eq!(record.sentiment_label(), expected);
    }
}

#[tokio::test]
async fn test_worker_pool_bounds_concurrency() {
    let english = MockEnglish::returning("POSITIVE", 0.9).with_delay(Duration::from_millis(50));
    let calls = english.calls();
    let analyzer = mocks::analyzer(
        MockDetector::returning("en"),
        english,
        MockMultilingual::failing(),
        mocks::fast_settings(2),
    )
    .await;
    assert_eq!(analyzer.settings().workers, 2);

    let started = Instant::now();
    let output = analyzer
        .analyze_batch(reviews(&["one one", "two two", "three", "four four"]))
        .await;

    assert_eq!(output.len(), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    // 4 records, 2 at a time, 50ms each
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_empty_batch() {
    let analyzer = mocks::analyzer(
        MockDetector::returning("en"),
        MockEnglish::returning("POSITIVE", 0.9),
        MockMultilingual::failing(),
        mocks::fast_settings(4),
    )
    .await;

    assert!(analyzer.analyze_batch(Vec::new()).await.is_empty());
}

#[tokio::test]
async fn test_summary_reports_degradation() {
    let analyzer = mocks::analyzer(
        MockDetector::failing(),
        english_failing_on("BOOM"),
        MockMultilingual::failing(),
        mocks::fast_settings(4),
    )
    .await;

    let output = analyzer
        .analyze_batch(reviews(&["BOOM", "support was helpful", "BOOM again"]))
        .await;
    let summary = BatchSummary::from_records(&output);

    assert_eq!(summary.total, 3);
    assert_eq!(summary.unknown_language, 3);
    assert_eq!(summary.sentiment_errors, 2);
    assert_eq!(summary.theme_errors, 0);
    assert!(summary.has_degradation());
    assert_eq!(summary.sentiment_by_bank["CBE"][&SentimentLabel::Positive], 1);
}
