use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_broadcast::{broadcast, InactiveReceiver, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::application::room::{GetRoomSnapshot, GetRoomSnapshotInput};
use crate::application::GameError;
use crate::domain::value_objects::{GameRules, RoomSnapshot};
use crate::infrastructure::auth::JwtService;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::database::repositories::SqliteRoomRepository;
use crate::infrastructure::database::run_migrations;
use crate::infrastructure::services::SessionManager;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,

    pub rules: GameRules,

    /// Issues per-player tokens
    pub jwt_service: Arc<JwtService>,

    /// Open event streams per room
    pub session_manager: Arc<SessionManager>,

    pub room_repo: Arc<SqliteRoomRepository>,

    /// Room event fan-out. The inactive receiver keeps the channel open
    /// while nobody is subscribed.
    pub event_sender: Sender<RoomEvent>,
    pub event_receiver: InactiveReceiver<RoomEvent>,
}

impl AppState {
    /// Build the state from environment configuration
    pub async fn new() -> anyhow::Result<Self> {
        Self::from_config(AppConfig::from_env()).await
    }

    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        config.rules.validate().map_err(anyhow::Error::msg)?;

        tracing::info!("Connecting to database: {}", config.database_url);
        let db = connect_pool(&config).await?;
        run_migrations(&db).await?;

        let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.token_ttl_seconds));
        let session_manager = Arc::new(SessionManager::new());
        let room_repo = Arc::new(SqliteRoomRepository::new(db));

        // Slow subscribers lose the oldest events instead of blocking publishers
        let (mut event_sender, event_receiver) = broadcast(config.event_capacity);
        event_sender.set_overflow(true);
        let event_receiver = event_receiver.deactivate();

        Ok(Self {
            rules: config.rules,
            config,
            jwt_service,
            session_manager,
            room_repo,
            event_sender,
            event_receiver,
        })
    }

    /// New receiver for every event published from now on
    pub fn subscribe(&self) -> Receiver<RoomEvent> {
        self.event_receiver.activate_cloned()
    }

    /// Broadcast an event to all connected SSE clients
    pub fn broadcast_event(&self, event: RoomEvent) {
        let receiver_count = self.event_sender.receiver_count();
        tracing::debug!(
            room_id = %event.room_id,
            "Broadcasting event '{}' to {} receivers",
            event.event_type,
            receiver_count
        );
        match self.event_sender.try_broadcast(event) {
            Ok(None) => {}
            Ok(Some(_)) => {
                tracing::debug!("Event broadcast with overflow, oldest event dropped");
            }
            Err(TrySendError::Inactive(_)) => {
                tracing::debug!("Event dropped, no active receivers");
            }
            Err(e) => {
                tracing::warn!("Failed to broadcast event: {:?}", e);
            }
        }
    }

    /// Publish the room's current snapshot, or a close notice if the room is gone
    pub async fn publish_snapshot(&self, room_id: &str, action: &str) {
        let use_case = GetRoomSnapshot::new(self.room_repo.clone());
        let input = GetRoomSnapshotInput {
            room_id: room_id.to_string(),
        };

        match use_case.execute(input).await {
            Ok(snapshot) => self.broadcast_event(RoomEvent::snapshot(snapshot).with_action(action)),
            Err(GameError::NotFound(_)) => {
                self.broadcast_event(RoomEvent::room_closed(room_id).with_action(action))
            }
            Err(e) => {
                tracing::warn!(room_id, "Failed to build snapshot after '{}': {}", action, e);
            }
        }
    }
}

async fn connect_pool(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    if let Some(parent) = config.database_path().and_then(|p| Path::new(p).parent()) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = if config.is_in_memory() {
        // Every connection would open its own empty database
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options.journal_mode(SqliteJournalMode::Wal))
            .await?
    };

    Ok(pool)
}

pub const EVENT_SNAPSHOT: &str = "snapshot";
pub const EVENT_ROOM_CLOSED: &str = "roomClosed";

/// Room event for SSE broadcasting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub room_id: String,
    /// Command that produced the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<RoomSnapshot>,
    pub timestamp: i64,
}

impl RoomEvent {
    pub fn new(event_type: &str, room_id: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            room_id: room_id.to_string(),
            action: None,
            snapshot: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn snapshot(snapshot: RoomSnapshot) -> Self {
        let room_id = snapshot.room_id().to_string();
        Self::new(EVENT_SNAPSHOT, &room_id).with_snapshot(snapshot)
    }

    pub fn room_closed(room_id: &str) -> Self {
        Self::new(EVENT_ROOM_CLOSED, room_id)
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    pub fn with_snapshot(mut self, snapshot: RoomSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Room version carried by the event, if it holds a snapshot
    pub fn version(&self) -> Option<i64> {
        self.snapshot.as_ref().map(|s| s.version)
    }
}
