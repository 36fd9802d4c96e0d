//! Finality polling and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use sui_types::TransactionDigest;
use tokio::sync::Notify;
use tracing::{debug, trace};

use crate::client::SuiClient;
use crate::types::ExecuteResult;

/// A one-shot signal shared between an operation and whoever may abort it.
///
/// Cloning shares the underlying flag. Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Give up after this long.
    pub timeout: Duration,
    /// Delay between status polls.
    pub poll_interval: Duration,
    pub signal: Option<CancelSignal>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(2),
            signal: None,
        }
    }
}

impl WaitOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_signal(mut self, signal: CancelSignal) -> Self {
        self.signal = Some(signal);
        self
    }
}

/// Poll until `digest` is known to the node.
///
/// Transport errors during a poll are retried on the next tick. Fails with a
/// timeout error once `options.timeout` elapses, or with a cancellation error
/// as soon as the signal fires.
pub async fn wait_for_transaction(
    client: &dyn SuiClient,
    digest: &TransactionDigest,
    options: WaitOptions,
) -> Result<ExecuteResult> {
    let signal = options.signal.clone().unwrap_or_default();
    if signal.is_cancelled() {
        return Err(anyhow!("Wait for transaction {} was cancelled", digest));
    }

    let poll = async {
        loop {
            match client.get_transaction_status(digest).await {
                Ok(Some(result)) => return result,
                Ok(None) => trace!(%digest, "transaction not yet available"),
                Err(e) => debug!(%digest, error = %e, "transaction status poll failed"),
            }
            tokio::time::sleep(options.poll_interval).await;
        }
    };

    tokio::select! {
        result = tokio::time::timeout(options.timeout, poll) => result.map_err(|_| {
            anyhow!(
                "Timed out waiting for transaction {} after {}ms",
                digest,
                options.timeout.as_millis()
            )
        }),
        _ = signal.cancelled() => Err(anyhow!("Wait for transaction {} was cancelled", digest)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockLedger;
    use sui_types::Digest;

    #[tokio::test]
    async fn test_cancel_signal_wakes_waiters() {
        let signal = CancelSignal::new();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.cancelled().await })
        };
        tokio::task::yield_now().await;
        signal.cancel();
        waiter.await.unwrap();
        assert!(signal.is_cancelled());
    }

    #[tokio::test]
    async fn test_wait_times_out_for_unknown_digest() {
        let ledger = MockLedger::new();
        let options = WaitOptions::default()
            .with_timeout(Duration::from_millis(50))
            .with_poll_interval(Duration::from_millis(5));
        let err = wait_for_transaction(&ledger, &Digest::new([3; 32]), options)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Timed out waiting for transaction"));
    }

    #[tokio::test]
    async fn test_wait_cancelled() {
        let ledger = MockLedger::new();
        let signal = CancelSignal::new();
        let options = WaitOptions::default()
            .with_poll_interval(Duration::from_millis(5))
            .with_signal(signal.clone());
        let digest = Digest::new([4; 32]);
        let wait = wait_for_transaction(&ledger, &digest, options);
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            signal.cancel();
        };
        let (result, _) = tokio::join!(wait, cancel);
        assert!(result.unwrap_err().to_string().contains("cancelled"));
    }
}
