//! Bounded waits on collaborator calls.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{name} failed: {message}")]
    Failed { name: &'static str, message: String },

    #[error("{name} timed out after {after:?}")]
    TimedOut { name: &'static str, after: Duration },
}

/// Await `call` for at most `limit`. A timeout is reported like any other
/// failure so callers can move to their next tier.
pub async fn bounded<T, E, F>(name: &'static str, limit: Duration, call: F) -> Result<T, CollaboratorError>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!(collaborator = name, error = %e, "Collaborator call failed");
            Err(CollaboratorError::Failed {
                name,
                message: e.to_string(),
            })
        }
        Err(_) => {
            warn!(
                collaborator = name,
                timeout_ms = limit.as_millis() as u64,
                "Collaborator call timed out"
            );
            Err(CollaboratorError::TimedOut { name, after: limit })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_passes_value_through() {
        let value = bounded("echo", Duration::from_secs(1), async { Ok::<_, String>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_bounded_wraps_failure() {
        let err = bounded("broken", Duration::from_secs(1), async {
            Err::<(), _>("boom".to_string())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CollaboratorError::Failed { name: "broken", .. }));
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let err = bounded("slow", Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, String>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CollaboratorError::TimedOut { .. }));
    }
}
