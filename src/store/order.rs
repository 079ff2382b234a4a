//! Sort criteria for listing records

use crate::store::UrlRecord;
use std::cmp::Ordering;
use std::fmt;

/// A named sort criterion, applied as one stable sort pass over a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderKey {
    CreatedAt,
    CreatedAtDesc,
    HitCount,
    HitCountDesc,
    LastBytes,
    LastBytesDesc,
}

impl OrderKey {
    /// Parses one query token
    ///
    /// Unrecognized tokens, including the empty string, map to
    /// `HitCountDesc`. `avgBytes` and `avgBytesDesc` are accepted as aliases
    /// of the byte-size keys.
    pub fn parse(token: &str) -> Self {
        match token.trim() {
            "createdAt" => Self::CreatedAt,
            "createdAtDesc" => Self::CreatedAtDesc,
            "hitCount" => Self::HitCount,
            "hitCountDesc" => Self::HitCountDesc,
            "lastBytes" | "avgBytes" => Self::LastBytes,
            "lastBytesDesc" | "avgBytesDesc" => Self::LastBytesDesc,
            _ => Self::HitCountDesc,
        }
    }

    /// Parses a comma-separated list such as `"hitCountDesc,createdAt"`
    pub fn parse_list(param: &str) -> Vec<Self> {
        param.split(',').map(Self::parse).collect()
    }

    /// Query token for this key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::CreatedAtDesc => "createdAtDesc",
            Self::HitCount => "hitCount",
            Self::HitCountDesc => "hitCountDesc",
            Self::LastBytes => "lastBytes",
            Self::LastBytesDesc => "lastBytesDesc",
        }
    }

    pub fn compare(&self, a: &UrlRecord, b: &UrlRecord) -> Ordering {
        match self {
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::CreatedAtDesc => b.created_at.cmp(&a.created_at),
            Self::HitCount => a.hit_count.cmp(&b.hit_count),
            Self::HitCountDesc => b.hit_count.cmp(&a.hit_count),
            Self::LastBytes => a.last_bytes.cmp(&b.last_bytes),
            Self::LastBytesDesc => b.last_bytes.cmp(&a.last_bytes),
        }
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orders `records` by applying each key as a stable sort pass
///
/// Records start in ascending `created_at` order (URL breaks exact ties), so
/// an empty key list yields creation order and ties left by the keys keep a
/// deterministic order. Because every pass is a full stable sort, the last
/// key is the primary ordering and earlier keys only order its ties:
/// `[HitCountDesc, CreatedAt]` sorts by creation time first.
pub fn sort_records(records: &mut [UrlRecord], order: &[OrderKey]) {
    records.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.url.cmp(&b.url))
    });

    for key in order {
        records.sort_by(|a, b| key.compare(a, b));
    }
}
