// src/core/deadline.rs
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::{ClientError, ClientResult};

/// Bound a collaborator call. On expiry the call is dropped and reported as
/// [`ClientError::Timeout`], so any guard held by the caller is released.
pub async fn within<T, F>(
    limit: Duration,
    service: &'static str,
    operation: &str,
    call: F,
) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(service, operation, "Operation exceeded {}s, giving up", limit.as_secs());
            Err(ClientError::Timeout {
                service,
                endpoint: operation.to_string(),
                seconds: limit.as_secs(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_hung_call_times_out() {
        let result: ClientResult<()> = within(
            Duration::from_secs(5),
            "job store",
            "save job",
            std::future::pending(),
        )
        .await;

        match result {
            Err(ClientError::Timeout { seconds, endpoint, .. }) => {
                assert_eq!(seconds, 5);
                assert_eq!(endpoint, "save job");
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_result_passes_through() {
        let result = within(Duration::from_secs(5), "matching engine", "details", async {
            Ok::<_, ClientError>(7)
        })
        .await;
        assert_eq!(result.unwrap(), 7);
    }
}
