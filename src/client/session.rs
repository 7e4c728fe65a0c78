use crate::client::projection::{project, ClientView};
use crate::domain::value_objects::RoomSnapshot;
use crate::infrastructure::app_state::{RoomEvent, EVENT_ROOM_CLOSED};

/// Result of feeding a snapshot to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Older than (or same as) the cached snapshot, or for another room
    Stale,
    /// Newer snapshot, but the derived view did not change
    Unchanged,
    Updated(ClientView),
}

/// State one connected client holds about its room.
///
/// The cached snapshot is replaced wholesale on every newer snapshot;
/// nothing is patched incrementally, so a client that missed updates
/// converges on the next one it receives.
#[derive(Debug, Clone)]
pub struct ClientSession {
    room_id: String,
    player_id: String,
    cached_snapshot: Option<RoomSnapshot>,
    view: Option<ClientView>,
    closed: bool,
}

impl ClientSession {
    pub fn new(room_id: impl Into<String>, player_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            player_id: player_id.into(),
            cached_snapshot: None,
            view: None,
            closed: false,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn snapshot(&self) -> Option<&RoomSnapshot> {
        self.cached_snapshot.as_ref()
    }

    pub fn view(&self) -> Option<&ClientView> {
        self.view.as_ref()
    }

    /// Version of the cached snapshot
    pub fn version(&self) -> Option<i64> {
        self.cached_snapshot.as_ref().map(|s| s.version)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn apply_snapshot(&mut self, snapshot: RoomSnapshot) -> ApplyOutcome {
        if self.closed || snapshot.room_id() != self.room_id {
            return ApplyOutcome::Stale;
        }
        if let Some(version) = self.version() {
            if snapshot.version <= version {
                return ApplyOutcome::Stale;
            }
        }

        let view = project(&snapshot, &self.player_id);
        self.cached_snapshot = Some(snapshot);

        if self.view.as_ref() == Some(&view) {
            return ApplyOutcome::Unchanged;
        }
        self.view = Some(view.clone());
        ApplyOutcome::Updated(view)
    }

    /// Drop everything once the room is gone. Returns false for another room.
    pub fn apply_room_closed(&mut self, room_id: &str) -> bool {
        if room_id != self.room_id {
            return false;
        }
        self.closed = true;
        self.cached_snapshot = None;
        self.view = None;
        true
    }

    /// Feed a server event
    pub fn apply_event(&mut self, event: RoomEvent) -> ApplyOutcome {
        if event.event_type == EVENT_ROOM_CLOSED {
            self.apply_room_closed(&event.room_id);
            return ApplyOutcome::Stale;
        }
        match event.snapshot {
            Some(snapshot) => self.apply_snapshot(snapshot),
            None => ApplyOutcome::Stale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::projection::tests::{snapshot, vote};
    use crate::domain::entities::GamePhase;

    #[test]
    fn test_first_snapshot_updates() {
        let mut session = ClientSession::new("room-1", "a");
        let outcome = session.apply_snapshot(snapshot(1, GamePhase::Game, Some(0), vec![]));

        match outcome {
            ApplyOutcome::Updated(view) => assert!(view.is_my_turn),
            other => panic!("expected update, got {:?}", other),
        }
        assert_eq!(session.version(), Some(1));
    }

    #[test]
    fn test_older_or_equal_versions_are_stale() {
        let mut session = ClientSession::new("room-1", "a");
        session.apply_snapshot(snapshot(5, GamePhase::Game, Some(0), vec![]));

        assert_eq!(
            session.apply_snapshot(snapshot(4, GamePhase::Game, Some(1), vec![])),
            ApplyOutcome::Stale
        );
        assert_eq!(
            session.apply_snapshot(snapshot(5, GamePhase::Game, Some(1), vec![])),
            ApplyOutcome::Stale
        );
        assert_eq!(session.view().and_then(|v| v.current_player.clone()).map(|p| p.id), Some("a".into()));
    }

    #[test]
    fn test_same_view_is_unchanged() {
        let mut session = ClientSession::new("room-1", "a");
        session.apply_snapshot(snapshot(1, GamePhase::Game, Some(0), vec![]));

        let outcome = session.apply_snapshot(snapshot(2, GamePhase::Game, Some(0), vec![]));
        assert_eq!(outcome, ApplyOutcome::Unchanged);
        assert_eq!(session.version(), Some(2));
    }

    #[test]
    fn test_skipped_versions_converge() {
        let mut late = ClientSession::new("room-1", "c");
        let mut live = ClientSession::new("room-1", "c");

        live.apply_snapshot(snapshot(1, GamePhase::Game, Some(0), vec![]));
        live.apply_snapshot(snapshot(2, GamePhase::Voting, Some(0), vec![]));
        live.apply_snapshot(snapshot(3, GamePhase::Voting, Some(0), vec![vote("a", "b")]));

        late.apply_snapshot(snapshot(1, GamePhase::Game, Some(0), vec![]));
        late.apply_snapshot(snapshot(3, GamePhase::Voting, Some(0), vec![vote("a", "b")]));

        assert_eq!(late.view(), live.view());
    }

    #[test]
    fn test_other_room_is_ignored() {
        let mut session = ClientSession::new("room-2", "a");
        let outcome = session.apply_snapshot(snapshot(1, GamePhase::Game, Some(0), vec![]));
        assert_eq!(outcome, ApplyOutcome::Stale);
        assert!(session.snapshot().is_none());
    }

    #[test]
    fn test_room_closed_clears_session() {
        let mut session = ClientSession::new("room-1", "a");
        session.apply_snapshot(snapshot(1, GamePhase::Lobby, None, vec![]));

        let outcome = session.apply_event(RoomEvent::room_closed("room-1"));
        assert_eq!(outcome, ApplyOutcome::Stale);
        assert!(session.is_closed());
        assert!(session.view().is_none());

        // Nothing is accepted after close
        let outcome = session.apply_snapshot(snapshot(2, GamePhase::Lobby, None, vec![]));
        assert_eq!(outcome, ApplyOutcome::Stale);
    }

    #[test]
    fn test_apply_event_with_snapshot() {
        let mut session = ClientSession::new("room-1", "b");
        let event = RoomEvent::snapshot(snapshot(7, GamePhase::Game, Some(1), vec![])).with_action("gameStarted");
        assert!(matches!(session.apply_event(event), ApplyOutcome::Updated(_)));
        assert_eq!(session.version(), Some(7));
    }
}
