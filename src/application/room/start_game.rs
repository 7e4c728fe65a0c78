use std::sync::Arc;

use crate::application::{load_room, require_host, require_phase, GameError};
use crate::domain::entities::GamePhase;
use crate::domain::repositories::{BeginRound, RoomRepository};
use crate::domain::services::pick_impostor;
use crate::domain::value_objects::GameRules;

/// Start game input
pub struct StartGameInput {
    pub room_id: String,
    pub player_id: String,
    pub topic: String,
    /// Fixed seed for the impostor draw (tests); `None` draws from entropy
    pub seed: Option<u64>,
}

/// Start game output
#[derive(Debug, Clone)]
pub struct StartGameOutput {
    pub impostor_id: String,
}

/// Start game use case
pub struct StartGame<R: RoomRepository> {
    room_repo: Arc<R>,
    rules: GameRules,
}

impl<R: RoomRepository> StartGame<R> {
    pub fn new(room_repo: Arc<R>, rules: GameRules) -> Self {
        Self { room_repo, rules }
    }

    pub async fn execute(&self, input: StartGameInput) -> Result<StartGameOutput, GameError> {
        let repo = self.room_repo.as_ref();
        let room = load_room(repo, &input.room_id).await?;

        require_phase(&room, GamePhase::Lobby)?;
        require_host(repo, &room, &input.player_id).await?;

        if room.member_ids.len() < self.rules.min_players {
            return Err(GameError::InsufficientPlayers {
                required: self.rules.min_players,
                actual: room.member_ids.len(),
            });
        }

        let impostor_id = pick_impostor(&room.member_ids, input.seed).ok_or(
            GameError::InsufficientPlayers {
                required: self.rules.min_players,
                actual: 0,
            },
        )?;

        repo.begin_round(&BeginRound {
            room_id: room.id.clone(),
            expected_version: room.version,
            pool: room.member_ids.clone(),
            impostor_id: impostor_id.clone(),
            topic: input.topic,
            round_number: 1,
        })
        .await?;

        tracing::info!(room_id = %room.id, "Game started with {} players", room.member_ids.len());

        Ok(StartGameOutput { impostor_id })
    }
}
