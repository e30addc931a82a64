//! Channel-backed progress sink.
//!
//! Forwards every `ProgressEvent` into a tokio `mpsc` channel so a UI or
//! logger task can consume them. Sending never blocks a step: a full or
//! closed channel is reported as a `ProgressSink` error, which the step
//! executor logs and drops.

use tokio::sync::mpsc;

use reasonchain_contracts::{
    error::{ReasonchainError, ReasonchainResult},
    progress::ProgressEvent,
};

use crate::traits::ProgressSink;

pub struct ChannelProgressSink {
    tx: mpsc::Sender<ProgressEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx }
    }

    /// A sink plus the receiver that drains it.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

impl ProgressSink for ChannelProgressSink {
    fn on_step(&self, event: &ProgressEvent) -> ReasonchainResult<()> {
        self.tx
            .try_send(event.clone())
            .map_err(|e| ReasonchainError::ProgressSink {
                reason: format!("progress channel unavailable: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use reasonchain_contracts::{
        capability::CapabilityId,
        chain::{ChainId, StepStatus},
    };

    use super::*;

    fn event(step_id: &str) -> ProgressEvent {
        ProgressEvent {
            chain_id: ChainId::new(),
            step_id: step_id.to_string(),
            capability: CapabilityId::market(),
            status: StepStatus::Completed,
            confidence: 0.7,
            duration_ms: 12,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn events_arrive_in_order() {
        let (sink, mut rx) = ChannelProgressSink::channel(4);
        sink.on_step(&event("01-market")).unwrap();
        sink.on_step(&event("02-market")).unwrap();

        assert_eq!(rx.recv().await.unwrap().step_id, "01-market");
        assert_eq!(rx.recv().await.unwrap().step_id, "02-market");
    }

    #[test]
    fn full_channel_is_an_error_not_a_block() {
        let (sink, _rx) = ChannelProgressSink::channel(1);
        sink.on_step(&event("a")).unwrap();
        assert!(matches!(
            sink.on_step(&event("b")),
            Err(ReasonchainError::ProgressSink { .. })
        ));
    }

    #[test]
    fn closed_channel_is_an_error() {
        let (sink, rx) = ChannelProgressSink::channel(1);
        drop(rx);
        assert!(sink.on_step(&event("a")).is_err());
    }
}
