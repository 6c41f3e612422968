//! The queued unit of work.
//!
//! Wire shape (JSON, one object per queue entry):
//! `{ "id": 1, "url": "...", "source": "...", "category": "...", "priority": 2 }`
//! where `id` may be an integer or a string and `priority` is 1 (highest)
//! through 5. A `Job` is immutable once parsed; the worker only derives a
//! [`Document`](crate::types::Document) from it.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::JobParseError;

/// Opaque job identifier, unique across the system.
///
/// Producers send either a JSON integer or a string; both normalize to a
/// string, which is also the idempotency key in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = JobId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an integer or string id")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<JobId, E> {
                Ok(JobId(v.to_string()))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<JobId, E> {
                Ok(JobId(v.to_string()))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<JobId, E> {
                Ok(JobId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Priority level, 1 (highest) through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Priority(u8);

impl Priority {
    pub const HIGHEST: Priority = Priority(1);
    pub const LOWEST: Priority = Priority(5);

    /// All levels, highest first. Queue backends poll in this order.
    pub fn levels() -> impl Iterator<Item = Priority> {
        (1..=5).map(Priority)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index for per-level storage.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<i64> for Priority {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1..=5 => Ok(Priority(value as u8)),
            other => Err(format!(
                "Field 'priority' must be one of [1, 2, 3, 4, 5], got {other}"
            )),
        }
    }
}

impl From<Priority> for i64 {
    fn from(p: Priority) -> i64 {
        i64::from(p.0)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated unit of work describing one URL to ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub url: String,
    pub source: String,
    pub category: String,
    pub priority: Priority,
}

impl Job {
    /// Parse and validate a raw queue payload.
    ///
    /// Missing fields, non-JSON payloads, and out-of-range priorities
    /// surface as [`JobParseError::Malformed`]; field constraints that
    /// serde cannot express (empty `url`) as [`JobParseError::Invalid`].
    pub fn parse(raw: &str) -> Result<Job, JobParseError> {
        let job: Job = serde_json::from_str(raw)?;
        job.validate()?;
        Ok(job)
    }

    fn validate(&self) -> Result<(), JobParseError> {
        if self.url.trim().is_empty() {
            return Err(JobParseError::Invalid {
                reason: "Field 'url' must be a non-empty string".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_and_string_ids() {
        let a = Job::parse(r#"{"id":1,"url":"http://a.test/x","source":"s","category":"c","priority":2}"#)
            .unwrap();
        assert_eq!(a.id.as_str(), "1");

        let b = Job::parse(r#"{"id":"abc","url":"http://a.test/x","source":"s","category":"c","priority":2}"#)
            .unwrap();
        assert_eq!(b.id.as_str(), "abc");
    }

    #[test]
    fn rejects_missing_field() {
        let err = Job::parse(r#"{"id":1,"url":"http://a.test/x","source":"s","priority":2}"#)
            .unwrap_err();
        assert!(matches!(err, JobParseError::Malformed(_)));
    }

    #[test]
    fn rejects_out_of_range_priority() {
        let err = Job::parse(r#"{"id":1,"url":"http://a.test/x","source":"s","category":"c","priority":9}"#)
            .unwrap_err();
        assert!(matches!(err, JobParseError::Malformed(_)));
    }

    #[test]
    fn rejects_empty_url() {
        let err = Job::parse(r#"{"id":1,"url":"  ","source":"s","category":"c","priority":1}"#)
            .unwrap_err();
        assert!(matches!(err, JobParseError::Invalid { .. }));
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            Job::parse("not json").unwrap_err(),
            JobParseError::Malformed(_)
        ));
    }

    #[test]
    fn priority_levels_are_highest_first() {
        let levels: Vec<u8> = Priority::levels().map(Priority::get).collect();
        assert_eq!(levels, vec![1, 2, 3, 4, 5]);
    }
}
