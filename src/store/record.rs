use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Download statistics for one submitted URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRecord {
    /// The URL exactly as submitted
    pub url: String,

    /// Number of times the URL was submitted
    pub hit_count: u64,

    pub download_success_count: u64,

    pub download_failure_count: u64,

    /// Size of the most recent download attempt; 0 when it failed.
    ///
    /// This is the last value seen, not a running average.
    pub last_bytes: u64,

    /// Duration of the most recent download attempt
    #[serde(rename = "lastDownloadTimeMs", serialize_with = "serialize_millis")]
    pub last_download_time: Duration,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Creates the record of a freshly registered URL
    pub(crate) fn new(url: &str, now: DateTime<Utc>) -> Self {
        Self {
            url: url.to_string(),
            hit_count: 1,
            download_success_count: 0,
            download_failure_count: 0,
            last_bytes: 0,
            last_download_time: Duration::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total number of completed download attempts
    pub fn download_count(&self) -> u64 {
        self.download_success_count + self.download_failure_count
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Aggregated counters over every record in a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub total_urls: u64,
    pub total_hits: u64,
    pub total_download_successes: u64,
    pub total_download_failures: u64,
}

impl StoreSummary {
    pub(crate) fn add(&mut self, record: &UrlRecord) {
        self.total_urls += 1;
        self.total_hits += record.hit_count;
        self.total_download_successes += record.download_success_count;
        self.total_download_failures += record.download_failure_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record() {
        let now = Utc::now();
        let record = UrlRecord::new("http://example.com", now);

        assert_eq!(record.hit_count, 1);
        assert_eq!(record.download_count(), 0);
        assert_eq!(record.last_bytes, 0);
        assert_eq!(record.created_at, now);
        assert_eq!(record.updated_at, now);
    }

    #[test]
    fn test_json_field_names() {
        let mut record = UrlRecord::new("http://example.com", Utc::now());
        record.last_download_time = Duration::from_millis(1500);

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["url"], "http://example.com");
        assert_eq!(json["hitCount"], 1);
        assert_eq!(json["downloadSuccessCount"], 0);
        assert_eq!(json["downloadFailureCount"], 0);
        assert_eq!(json["lastBytes"], 0);
        assert_eq!(json["lastDownloadTimeMs"], 1500);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn test_summary_add() {
        let mut record = UrlRecord::new("http://example.com", Utc::now());
        record.hit_count = 4;
        record.download_success_count = 2;
        record.download_failure_count = 1;

        let mut summary = StoreSummary::default();
        summary.add(&record);
        summary.add(&record);

        assert_eq!(summary.total_urls, 2);
        assert_eq!(summary.total_hits, 8);
        assert_eq!(summary.total_download_successes, 4);
        assert_eq!(summary.total_download_failures, 2);
    }
}
