//! Remote video platform error taxonomy.
//!
//! A closed sum of the failure modes the Worker must branch on (see
//! spec §7). Callers match exhaustively; there is no catch-all variant.

/// Remote platform failure kinds and their associated detail.
#[derive(Debug, Clone, derive_more::Display)]
pub enum RemoteErrorKind {
    /// Daily quota has been exhausted; the Worker must sleep until reset.
    #[display("quota exceeded: {}", _0)]
    QuotaExceeded(String),
    /// A single-id lookup (videos.list, getRating, rate) returned 404.
    #[display("video not found: {}", _0)]
    VideoNotFound(String),
    /// 401/403 not attributable to quota; requires operator intervention.
    #[display("authentication failed: {}", _0)]
    Authentication(String),
    /// Timeout, 5xx, or transport failure; safe to retry later.
    #[display("network error: {}", _0)]
    Network(String),
    /// 400 with a non-quota reason; indicates a caller bug.
    #[display("invalid request: {}", _0)]
    InvalidRequest(String),
}

impl RemoteErrorKind {
    /// Classify an HTTP status code and JSON error body into a kind.
    ///
    /// `body` is scanned (case-insensitively) for the quota markers the
    /// platform is known to use: `quotaExceeded`, `rateLimitExceeded`,
    /// `dailyLimitExceeded`, `limitExceeded`, or the substrings "quota" /
    /// "rate limit".
    pub fn classify(status: u16, body: &str) -> Self {
        let lower = body.to_ascii_lowercase();
        let quota_markers = [
            "quotaexceeded",
            "ratelimitexceeded",
            "dailylimitexceeded",
            "limitexceeded",
            "quota",
            "rate limit",
        ];
        if quota_markers.iter().any(|m| lower.contains(m)) {
            return RemoteErrorKind::QuotaExceeded(body.to_string());
        }
        match status {
            404 => RemoteErrorKind::VideoNotFound(body.to_string()),
            401 | 403 => RemoteErrorKind::Authentication(body.to_string()),
            400 => RemoteErrorKind::InvalidRequest(body.to_string()),
            _ => RemoteErrorKind::Network(format!("HTTP {status}: {body}")),
        }
    }

    /// True for [`RemoteErrorKind::QuotaExceeded`].
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, RemoteErrorKind::QuotaExceeded(_))
    }
}

/// Remote platform error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Remote Error: {} at line {} in {}", kind, line, file)]
pub struct RemoteError {
    /// The kind of failure.
    pub kind: RemoteErrorKind,
    /// Line number where the error was created.
    pub line: u32,
    /// File where the error was created.
    pub file: &'static str,
}

impl RemoteError {
    /// Create a new RemoteError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RemoteErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RemoteErrorKind {
        &self.kind
    }
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for RemoteError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            return RemoteError::new(RemoteErrorKind::Network(err.to_string()));
        }
        match err.status().map(|s| s.as_u16()) {
            Some(404) => RemoteError::new(RemoteErrorKind::VideoNotFound(err.to_string())),
            Some(401) | Some(403) => {
                RemoteError::new(RemoteErrorKind::Authentication(err.to_string()))
            }
            Some(400) => RemoteError::new(RemoteErrorKind::InvalidRequest(err.to_string())),
            _ => RemoteError::new(RemoteErrorKind::Network(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_quota_markers_over_status() {
        let kind = RemoteErrorKind::classify(403, r#"{"error":"quotaExceeded"}"#);
        assert!(kind.is_quota_exceeded());
    }

    #[test]
    fn classifies_404_as_not_found() {
        let kind = RemoteErrorKind::classify(404, "no such video");
        assert!(matches!(kind, RemoteErrorKind::VideoNotFound(_)));
    }

    #[test]
    fn classifies_plain_403_as_authentication() {
        let kind = RemoteErrorKind::classify(403, "invalid_grant");
        assert!(matches!(kind, RemoteErrorKind::Authentication(_)));
    }
}
