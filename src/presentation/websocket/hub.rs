//! Broadcast Hub
//!
//! Maintains the set of currently live outbound handles, one per open
//! connection. Delivery is fail-fast: a member whose send fails is evicted
//! and delivery continues to the remaining members. Membership only changes
//! on connect, delivery failure, or explicit close from the transport layer.

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::state::ChatMessage;

/// Opaque id of one attached connection.
pub type ConnectionId = Uuid;

/// Fan-out hub for newly created messages.
#[derive(Debug, Default)]
pub struct BroadcastHub {
    members: DashMap<ConnectionId, mpsc::UnboundedSender<ChatMessage>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new connection, returning its id and the receiving end of
    /// its outbound channel.
    pub fn attach(&self) -> (ConnectionId, mpsc::UnboundedReceiver<ChatMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.attach_sender(tx);
        (id, rx)
    }

    /// Attach an externally created sender.
    pub fn attach_sender(&self, sender: mpsc::UnboundedSender<ChatMessage>) -> ConnectionId {
        let id = Uuid::new_v4();
        self.members.insert(id, sender);
        tracing::debug!(connection_id = %id, members = self.member_count(), "Connection attached");
        id
    }

    /// Detach a connection on explicit close.
    pub fn detach(&self, id: &ConnectionId) {
        if self.members.remove(id).is_some() {
            tracing::debug!(connection_id = %id, "Connection detached");
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Deliver a message to every member, evicting members whose delivery
    /// fails without aborting delivery to the rest.
    pub fn broadcast(&self, message: &ChatMessage) {
        let mut failed: Vec<ConnectionId> = Vec::new();
        for member in self.members.iter() {
            if member.value().send(message.clone()).is_err() {
                failed.push(*member.key());
            }
        }
        for id in failed {
            self.members.remove(&id);
            tracing::debug!(connection_id = %id, "Evicted dead connection during broadcast");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ChatMessage {
        ChatMessage {
            from: "neo".into(),
            body: "hi".into(),
            timestamp: 1,
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_every_member() {
        let hub = BroadcastHub::new();
        let (_a, mut rx_a) = hub.attach();
        let (_b, mut rx_b) = hub.attach();

        hub.broadcast(&message());

        assert_eq!(rx_a.recv().await.unwrap().body, "hi");
        assert_eq!(rx_b.recv().await.unwrap().body, "hi");
    }

    #[tokio::test]
    async fn failed_delivery_evicts_without_aborting_others() {
        let hub = BroadcastHub::new();
        let (_a, mut rx_a) = hub.attach();
        let (_dead, rx_dead) = hub.attach();
        let (_c, mut rx_c) = hub.attach();
        drop(rx_dead);

        hub.broadcast(&message());

        assert_eq!(hub.member_count(), 2);
        assert_eq!(rx_a.recv().await.unwrap().body, "hi");
        assert_eq!(rx_c.recv().await.unwrap().body, "hi");
    }

    #[tokio::test]
    async fn detach_removes_membership() {
        let hub = BroadcastHub::new();
        let (id, _rx) = hub.attach();
        assert_eq!(hub.member_count(), 1);
        hub.detach(&id);
        assert_eq!(hub.member_count(), 0);
    }
}
