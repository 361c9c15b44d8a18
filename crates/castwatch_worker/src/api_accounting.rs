//! Shared API usage bookkeeping for every remote call site.

use castwatch_database::Store;
use castwatch_error::RemoteError;
use tracing::warn;

/// Records `result` against the API usage counters and call log, then
/// returns it unchanged. Quota-exceeded failures are logged with
/// `quota_cost = 0` (spec §7: "do not consume additional quota"); any other
/// failure is logged with the cost the caller would have paid had it
/// succeeded, since the request was actually sent.
pub async fn record_outcome<T>(
    store: &Store,
    method: &str,
    cost_on_success: i32,
    result: Result<T, RemoteError>,
) -> Result<T, RemoteError> {
    let (success, cost, error) = match &result {
        Ok(_) => (true, cost_on_success, None),
        Err(e) if e.kind().is_quota_exceeded() => (false, 0, Some(e.to_string())),
        Err(e) => (false, cost_on_success, Some(e.to_string())),
    };
    if let Err(store_err) = store
        .record_api_call(method, success, cost, error.as_deref())
        .await
    {
        warn!(error = %store_err, method, "failed to record api call accounting");
    }
    result
}
