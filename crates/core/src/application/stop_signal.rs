// Collector Stop Token

use tokio::sync::watch;

/// Stop signal observed by a collector
#[derive(Clone)]
pub struct StopToken {
    rx: watch::Receiver<bool>,
}

impl StopToken {
    /// Check if stop was requested
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for the stop signal. Also resolves if the sender is gone.
    pub async fn wait(&mut self) {
        if self.is_stopped() {
            return;
        }
        let _ = self.rx.changed().await;
    }
}

/// Stop sender, held by whoever may terminate the command
pub struct StopSender {
    tx: watch::Sender<bool>,
}

impl StopSender {
    /// Signal the collector to kill its process and exit
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

/// Create a stop channel
pub fn stop_channel() -> (StopSender, StopToken) {
    let (tx, rx) = watch::channel(false);
    (StopSender { tx }, StopToken { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_resolves_after_stop() {
        let (sender, mut token) = stop_channel();
        assert!(!token.is_stopped());

        sender.stop();
        tokio::time::timeout(Duration::from_secs(1), token.wait())
            .await
            .unwrap();
        assert!(token.is_stopped());
    }

    #[tokio::test]
    async fn test_wait_resolves_when_sender_dropped() {
        let (sender, mut token) = stop_channel();
        drop(sender);

        tokio::time::timeout(Duration::from_secs(1), token.wait())
            .await
            .unwrap();
    }
}
