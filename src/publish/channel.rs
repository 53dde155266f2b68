//! In-process channel transport.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use super::{PublishError, Transport};

/// Hands payloads to an unbounded queue. The receiver side belongs to the caller.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<Bytes>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Bytes>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    fn name(&self) -> &'static str {
        "channel"
    }

    async fn send(&self, payload: Bytes) -> Result<(), PublishError> {
        self.tx.send(payload).map_err(|_| PublishError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_after_receiver_dropped_is_closed() {
        let (transport, rx) = ChannelTransport::new();
        drop(rx);
        let err = transport.send(Bytes::from_static(b"{}")).await.unwrap_err();
        assert!(matches!(err, PublishError::Closed));
    }
}
