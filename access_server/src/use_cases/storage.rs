use std::future::Future;
use std::time::Duration;

// Bounds a storage call so no scan can hang on a stuck connection.
pub(crate) async fn with_timeout<T, F>(
    limit: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, String>
where
    F: Future<Output = Result<T, String>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(format!(
            "{operation} timed out after {}ms",
            limit.as_millis()
        )),
    }
}
