//! In-process pub/sub broker
//!
//! Signals are wake-ups, not data: a subscriber that receives one re-reads
//! whatever view it is serving. Publishing never blocks; a subscriber whose
//! buffer is full simply misses that signal.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::config::BrokerConfig;

use super::topics::Topic;

type Registry = HashMap<String, Vec<mpsc::Sender<String>>>;

/// Topic registry shared by publishers and subscribers
#[derive(Clone)]
pub struct Broker {
    topics: Arc<RwLock<Registry>>,
    buffer: usize,
}

/// Receiving end of one subscription; dropping it unsubscribes
#[derive(Debug)]
pub struct Subscription {
    topic: Topic,
    receiver: mpsc::Receiver<String>,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Wait for the next signal; `None` once the broker is gone
    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }
}

impl Broker {
    /// A `buffer` of 0 is treated as 1
    pub fn new(buffer: usize) -> Self {
        Self {
            topics: Arc::new(RwLock::new(HashMap::new())),
            buffer: buffer.max(1),
        }
    }

    pub fn from_config(config: &BrokerConfig) -> Self {
        Self::new(config.buffer)
    }

    /// Register a new subscriber on `topic`, creating the topic if needed
    pub fn subscribe(&self, topic: Topic) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.buffer);
        let key = topic.to_string();

        let mut topics = self.topics.write().unwrap_or_else(PoisonError::into_inner);
        topics.retain(|_, senders| {
            senders.retain(|s| !s.is_closed());
            !senders.is_empty()
        });
        topics.entry(key).or_default().push(sender);

        tracing::debug!(topic = %topic, "Subscribed");
        Subscription { topic, receiver }
    }

    /// Offer `signal` to every current subscriber of `topic`
    pub fn publish(&self, topic: Topic, signal: &str) {
        let key = topic.to_string();
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        let Some(senders) = topics.get(&key) else {
            return;
        };

        for sender in senders {
            match sender.try_send(signal.to_string()) {
                Ok(()) | Err(TrySendError::Closed(_)) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::debug!(topic = %key, "Subscriber buffer full, signal dropped");
                }
            }
        }
    }

    /// Live subscribers on `topic`
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        topics
            .get(&topic.to_string())
            .map_or(0, |senders| senders.iter().filter(|s| !s.is_closed()).count())
    }
}
