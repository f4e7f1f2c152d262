//! Small helpers shared by the entity modules and fixtures.

use anyhow::Context;
use bson::{DateTime, Document};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};

/// UTC midnight of the given calendar day.
pub fn date(year: i32, month: u32, day: u32) -> anyhow::Result<DateTime> {
    let midnight = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .with_context(|| format!("invalid calendar date {year:04}-{month:02}-{day:02}"))?;
    Ok(DateTime::from_chrono(midnight.and_utc()))
}

/// Serialize each record into a BSON document.
pub fn to_documents<T: Serialize>(records: &[T]) -> anyhow::Result<Vec<Document>> {
    records
        .iter()
        .map(|record| bson::to_document(record).context("failed to encode record as BSON"))
        .collect()
}

/// Decode documents read back from a collection.
pub fn from_documents<T: DeserializeOwned>(documents: Vec<Document>) -> anyhow::Result<Vec<T>> {
    documents
        .into_iter()
        .map(|document| bson::from_document(document).context("failed to decode BSON document"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_is_utc_midnight() {
        let parsed = date(2015, 3, 10).unwrap();
        assert_eq!(parsed.timestamp_millis(), 1_425_945_600_000);
    }

    #[test]
    fn invalid_date_is_an_error() {
        let error = date(2023, 2, 30).unwrap_err();
        assert!(error.to_string().contains("2023-02-30"));
    }
}
