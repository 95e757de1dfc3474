//! Review CSV ingestion and cleaning.
//!
//! Expected header: `review,rating,date,bank,source`. Extra columns are
//! ignored.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::ReviewRecord;

/// Output format of cleaned dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%B %d, %Y", "%b %d, %Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Reads review rows from a CSV file.
pub fn read_reviews(path: &Path) -> Result<Vec<ReviewRecord>, AppError> {
    let file = File::open(path)?;
    let reviews = read_reviews_from(file)?;
    info!("Loaded {} reviews from {}", reviews.len(), path.display());
    Ok(reviews)
}

/// Reads review rows from any CSV source.
///
/// A row that cannot be decoded is logged and skipped; a missing or
/// unreadable header is an error.
pub fn read_reviews_from<R: Read>(source: R) -> Result<Vec<ReviewRecord>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    if !headers.iter().any(|h| h.trim() == "bank") {
        return Err(AppError::Validation(
            "review CSV has no 'bank' column".to_string(),
        ));
    }

    let mut reviews = Vec::new();
    for (line_num, result) in reader.deserialize::<ReviewRecord>().enumerate() {
        match result {
            Ok(review) => reviews.push(review),
            Err(e) => warn!("Skipping CSV line {}: {}", line_num + 2, e),
        }
    }
    Ok(reviews)
}

/// Parses the date formats seen in review exports.
pub fn parse_review_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}

/// Upstream cleaning pass.
///
/// Drops rows without review text, keeps the first of rows sharing the same
/// text, normalizes dates to `YYYY-MM-DD` and drops rows whose date does not
/// parse.
pub fn clean_reviews(reviews: Vec<ReviewRecord>) -> Vec<ReviewRecord> {
    let initial = reviews.len();
    let mut seen = HashSet::new();

    let cleaned: Vec<ReviewRecord> = reviews
        .into_iter()
        .filter(|r| r.text.is_some())
        .filter(|r| seen.insert(r.text.clone()))
        .filter_map(|mut r| {
            let date = parse_review_date(&r.date)?;
            r.date = date.format(DATE_FORMAT).to_string();
            Some(r)
        })
        .collect();

    info!("Cleaned reviews: {} of {} rows kept", cleaned.len(), initial);
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
review,rating,date,bank,source
Great app,5,2024-05-01,CBE,Google Play
,3,2024-05-02,CBE,Google Play
nan,4.0,2024-05-03,BOA,Google Play
ጥሩ ነው,5,05/04/2024,Dashen,Google Play
";

    #[test]
    fn test_read_reviews_from() {
        let reviews = read_reviews_from(SAMPLE.as_bytes()).unwrap();

        assert_eq!(reviews.len(), 4);
        assert_eq!(reviews[0].text(), Some("Great app"));
        assert_eq!(reviews[0].rating, Some(5));
        assert_eq!(reviews[1].text(), None);
        assert_eq!(reviews[2].text(), None);
        assert_eq!(reviews[2].rating, Some(4));
        assert_eq!(reviews[3].bank, "Dashen");
    }

    #[test]
    fn test_missing_bank_column_is_rejected() {
        let result = read_reviews_from("review,rating\nGood,5\n".as_bytes());
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_read_reviews_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let reviews = read_reviews(file.path()).unwrap();
        assert_eq!(reviews.len(), 4);
    }

    #[test]
    fn test_parse_review_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 4);
        assert_eq!(parse_review_date("2024-05-04"), expected);
        assert_eq!(parse_review_date("2024-05-04 13:45:10"), expected);
        assert_eq!(parse_review_date("2024-05-04T13:45:10Z"), expected);
        assert_eq!(parse_review_date("05/04/2024"), expected);
        assert_eq!(parse_review_date("yesterday"), None);
        assert_eq!(parse_review_date(""), None);
    }

    #[test]
    fn test_clean_reviews() {
        let reviews = vec![
            ReviewRecord::new(Some("Great app"), Some(5), "2024-05-01 10:00:00", "CBE", "Google Play"),
            ReviewRecord::new(None, Some(1), "2024-05-01", "CBE", "Google Play"),
            ReviewRecord::new(Some("Great app"), Some(4), "2024-05-02", "BOA", "Google Play"),
            ReviewRecord::new(Some("Slow"), Some(2), "not a date", "BOA", "Google Play"),
            ReviewRecord::new(Some("Fees too high"), Some(2), "05/03/2024", "BOA", "Google Play"),
        ];

        let cleaned = clean_reviews(reviews);

        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].text(), Some("Great app"));
        assert_eq!(cleaned[0].bank, "CBE");
        assert_eq!(cleaned[0].date, "2024-05-01");
        assert_eq!(cleaned[1].date, "2024-05-03");
    }

    #[test]
    fn test_clean_drops_missing_markers() {
        let csv = "\
review,rating,date,bank,source
NA,5,2024-05-01,CBE,Google Play
<NA>,4,2024-05-01,CBE,Google Play
#N/A,3,2024-05-01,BOA,Google Play
NA bank is great,5,2024-05-01,BOA,Google Play
";
        let cleaned = clean_reviews(read_reviews_from(csv.as_bytes()).unwrap());

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].text(), Some("NA bank is great"));
    }
}
