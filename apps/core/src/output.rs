//! Analyzed review CSV export.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::analysis::AnalyzedRecord;
use crate::error::AppError;

/// Column order of the analyzed CSV.
pub const ANALYZED_HEADER: [&str; 9] = [
    "review",
    "rating",
    "date",
    "bank",
    "source",
    "language",
    "sentiment",
    "sentiment_score",
    "themes",
];

/// Writes analyzed rows as CSV. Themes are encoded as a JSON array so their
/// order survives the round trip.
pub fn write_analyzed<W: Write>(sink: W, records: &[AnalyzedRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(ANALYZED_HEADER)?;

    for record in records {
        let review = record.review();
        let rating = review.rating.map(|r| r.to_string()).unwrap_or_default();
        let themes = serde_json::to_string(record.themes())?;
        let score = format!("{:.4}", record.sentiment_score());

        writer.write_record([
            review.text().unwrap_or(""),
            rating.as_str(),
            review.date.as_str(),
            review.bank.as_str(),
            review.source.as_str(),
            record.language().code(),
            record.sentiment_label().as_str(),
            score.as_str(),
            themes.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes analyzed rows to `path`, creating parent directories.
pub fn write_analyzed_file(path: &Path, records: &[AnalyzedRecord]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_analyzed(file, records)?;
    info!("Wrote {} analyzed reviews to {}", records.len(), path.display());
    Ok(())
}
