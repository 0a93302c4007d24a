use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::ContentEvent;

/// In-process event bus backed by `tokio::broadcast`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<ContentEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish an event to all current subscribers. Returns how many
    /// received it; zero when nobody is listening.
    pub fn publish(&self, event: ContentEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ContentEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::{ChangeAction, ChangeEvent, Resource};

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        assert_eq!(bus.publish(ContentEvent::Welcome), 1);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ContentEvent::Welcome));
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        let change = ChangeEvent::now(Resource::Config, ChangeAction::Updated, None);
        bus.publish(ContentEvent::Changed(change.clone()));

        assert_eq!(rx1.recv().await.unwrap(), ContentEvent::Changed(change.clone()));
        assert_eq!(rx2.recv().await.unwrap(), ContentEvent::Changed(change));
    }

    #[test]
    fn publishing_without_listeners_is_not_an_error() {
        let bus = EventBus::new(4);
        assert_eq!(bus.publish(ContentEvent::Reconnect), 0);
    }
}
