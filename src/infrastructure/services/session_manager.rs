use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

/// One open event stream
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub subscription_id: String,
    pub player_id: String,
    pub room_id: String,
    pub connected_at: i64,
}

/// Tracks which players currently hold an event stream, per room.
/// A player may hold several streams (one per tab).
pub struct SessionManager {
    subscribers: RwLock<HashMap<String, Subscriber>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new stream
    pub fn connect(&self, room_id: &str, player_id: &str) -> Subscriber {
        let subscriber = Subscriber {
            subscription_id: Uuid::new_v4().to_string(),
            player_id: player_id.to_string(),
            room_id: room_id.to_string(),
            connected_at: chrono::Utc::now().timestamp_millis(),
        };

        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        subscribers.insert(subscriber.subscription_id.clone(), subscriber.clone());
        subscriber
    }

    /// Forget a stream
    pub fn disconnect(&self, subscription_id: &str) {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        subscribers.remove(subscription_id);
    }

    /// Check if a player has at least one open stream
    pub fn is_connected(&self, player_id: &str) -> bool {
        let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
        subscribers.values().any(|s| s.player_id == player_id)
    }

    /// Streams open on a room, oldest first
    pub fn get_room_subscribers(&self, room_id: &str) -> Vec<Subscriber> {
        let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
        let mut room: Vec<_> = subscribers
            .values()
            .filter(|s| s.room_id == room_id)
            .cloned()
            .collect();
        room.sort_by(|a, b| a.connected_at.cmp(&b.connected_at));
        room
    }

    /// Count open streams
    pub fn count(&self) -> usize {
        let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
        subscribers.len()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_and_disconnect() {
        let manager = SessionManager::new();
        let first = manager.connect("room-1", "alice");
        let second = manager.connect("room-1", "alice");
        manager.connect("room-2", "bob");

        assert_eq!(manager.count(), 3);
        assert_eq!(manager.get_room_subscribers("room-1").len(), 2);

        manager.disconnect(&first.subscription_id);
        assert!(manager.is_connected("alice"));

        manager.disconnect(&second.subscription_id);
        assert!(!manager.is_connected("alice"));
        assert!(manager.get_room_subscribers("room-1").is_empty());
        assert!(manager.is_connected("bob"));
    }
}
