//! Bulk shortening: one URL per line, processed strictly in order.

use tracing::debug;

use crate::{
    shortener::{ShortenRequest, ShortenResult, Shortener},
    validation::is_valid_url,
};

pub const DEFAULT_BULK_MAX: usize = 10;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BulkReport {
    /// `(original, short_url)`
    pub succeeded: Vec<(String, String)>,
    /// `(original, reason)`
    pub failed: Vec<(String, String)>,
    /// Lines that are not URLs at all.
    pub rejected: Vec<String>,
}

impl BulkReport {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BulkOutcome {
    Report(BulkReport),
    /// The batch was over the cap; nothing was shortened.
    TooMany { count: usize, max: usize },
}

/// Non-empty trimmed lines of `raw`.
pub fn split_lines(raw: &str) -> Vec<&str> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

pub async fn process_bulk(shortener: &dyn Shortener, raw: &str, max: usize) -> BulkOutcome {
    let lines = split_lines(raw);
    if lines.len() > max {
        return BulkOutcome::TooMany {
            count: lines.len(),
            max,
        };
    }

    let (valid, rejected): (Vec<&str>, Vec<&str>) =
        lines.into_iter().partition(|l| is_valid_url(l));

    let mut report = BulkReport {
        rejected: rejected.into_iter().map(str::to_string).collect(),
        ..Default::default()
    };

    for url in valid {
        let result = match ShortenRequest::new(url, None) {
            Ok(req) => shortener.shorten(&req).await,
            Err(e) => ShortenResult::internal(e),
        };
        debug!(url, ok = result.is_success(), "bulk item processed");

        match result {
            ShortenResult::Success { short_url, .. } => {
                report.succeeded.push((url.to_string(), short_url));
            }
            failure => {
                let reason = failure
                    .user_message()
                    .unwrap_or_else(|| "Unknown error".to_string());
                report.failed.push((url.to_string(), reason));
            }
        }
    }

    BulkOutcome::Report(report)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use async_trait::async_trait;

    use super::*;
    use crate::shortener::FailureKind;

    #[derive(Default)]
    struct FakeShortener {
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl Shortener for FakeShortener {
        async fn shorten(&self, req: &ShortenRequest) -> ShortenResult {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(req.long_url().to_string());
            if self.fail_on == Some(req.long_url()) {
                return ShortenResult::failure(
                    FailureKind::Upstream,
                    "URL blocked by Cuttly",
                    Some(8),
                );
            }
            ShortenResult::success(format!("https://cutt.ly/s{n}"), false)
        }
    }

    #[tokio::test]
    async fn over_cap_is_rejected_without_calls() {
        let s = FakeShortener::default();
        let raw = (0..11)
            .map(|i| format!("https://example{i}.com"))
            .collect::<Vec<_>>()
            .join("\n");

        let out = process_bulk(&s, &raw, DEFAULT_BULK_MAX).await;

        assert_eq!(out, BulkOutcome::TooMany { count: 11, max: 10 });
        assert_eq!(s.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exactly_at_cap_is_processed() {
        let s = FakeShortener::default();
        let raw = (0..10)
            .map(|i| format!("https://example{i}.com"))
            .collect::<Vec<_>>()
            .join("\n");

        let BulkOutcome::Report(r) = process_bulk(&s, &raw, DEFAULT_BULK_MAX).await else {
            panic!("expected a report");
        };
        assert_eq!(r.succeeded.len(), 10);
        assert_eq!(s.calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn mixed_input_is_classified_in_order() {
        let s = FakeShortener::default();
        let raw = "https://a.com\nnot a url\nhttps://b.com";

        let BulkOutcome::Report(r) = process_bulk(&s, raw, DEFAULT_BULK_MAX).await else {
            panic!("expected a report");
        };

        assert_eq!(r.succeeded.len(), 2);
        assert_eq!(r.succeeded[0].0, "https://a.com");
        assert_eq!(r.succeeded[1].0, "https://b.com");
        assert_eq!(r.rejected, vec!["not a url".to_string()]);
        assert!(r.failed.is_empty());
        assert_eq!(
            *s.seen.lock().unwrap(),
            vec!["https://a.com".to_string(), "https://b.com".to_string()]
        );
    }

    #[tokio::test]
    async fn blank_lines_and_padding_are_ignored() {
        let s = FakeShortener::default();
        let raw = "\n   https://a.com   \n\n\t\n";

        let BulkOutcome::Report(r) = process_bulk(&s, raw, DEFAULT_BULK_MAX).await else {
            panic!("expected a report");
        };
        assert_eq!(r.succeeded[0].0, "https://a.com");
        assert_eq!(r.attempted(), 1);
    }

    #[tokio::test]
    async fn upstream_failures_are_bucketed() {
        let s = FakeShortener {
            fail_on: Some("https://bad.com"),
            ..Default::default()
        };
        let raw = "https://good.com\nhttps://bad.com";

        let BulkOutcome::Report(r) = process_bulk(&s, raw, DEFAULT_BULK_MAX).await else {
            panic!("expected a report");
        };
        assert_eq!(r.succeeded.len(), 1);
        assert_eq!(
            r.failed,
            vec![(
                "https://bad.com".to_string(),
                "Cuttly Error: URL blocked by Cuttly".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn only_invalid_lines_make_no_calls() {
        let s = FakeShortener::default();
        let BulkOutcome::Report(r) = process_bulk(&s, "foo\nbar", DEFAULT_BULK_MAX).await else {
            panic!("expected a report");
        };
        assert_eq!(r.rejected.len(), 2);
        assert_eq!(r.attempted(), 0);
        assert_eq!(s.calls.load(Ordering::SeqCst), 0);
    }
}
