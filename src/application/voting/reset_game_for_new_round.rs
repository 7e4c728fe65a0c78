use std::sync::Arc;

use crate::application::{load_room, require_phase, GameError};
use crate::domain::entities::GamePhase;
use crate::domain::repositories::{BeginRound, RoomRepository};
use crate::domain::services::pick_impostor;
use crate::domain::value_objects::GameRules;

/// Reset game for new round input
pub struct ResetGameForNewRoundInput {
    pub room_id: String,
    pub new_topic: String,
    /// Fixed seed for the impostor draw (tests); `None` draws from entropy
    pub seed: Option<u64>,
}

/// Reset game for new round output
#[derive(Debug, Clone)]
pub struct ResetGameForNewRoundOutput {
    pub impostor_id: String,
    pub round_number: u32,
}

/// Start the next round among the players still in contention.
///
/// Eliminated players keep their impostor flag and can never be drawn.
pub struct ResetGameForNewRound<R: RoomRepository> {
    room_repo: Arc<R>,
    rules: GameRules,
}

impl<R: RoomRepository> ResetGameForNewRound<R> {
    pub fn new(room_repo: Arc<R>, rules: GameRules) -> Self {
        Self { room_repo, rules }
    }

    pub async fn execute(
        &self,
        input: ResetGameForNewRoundInput,
    ) -> Result<ResetGameForNewRoundOutput, GameError> {
        let repo = self.room_repo.as_ref();
        let room = load_room(repo, &input.room_id).await?;

        require_phase(&room, GamePhase::Results)?;

        let pool: Vec<String> = repo
            .find_players_in_room(&room.id)
            .await?
            .into_iter()
            .filter(|p| !p.is_eliminated)
            .map(|p| p.id)
            .collect();

        if pool.len() < self.rules.min_players {
            return Err(GameError::InsufficientPlayers {
                required: self.rules.min_players,
                actual: pool.len(),
            });
        }

        let impostor_id = pick_impostor(&pool, input.seed).ok_or(GameError::InsufficientPlayers {
            required: self.rules.min_players,
            actual: 0,
        })?;
        let round_number = room.current_round() + 1;

        repo.begin_round(&BeginRound {
            room_id: room.id.clone(),
            expected_version: room.version,
            pool,
            impostor_id: impostor_id.clone(),
            topic: input.new_topic,
            round_number,
        })
        .await?;

        tracing::info!(room_id = %room.id, "Round {} started", round_number);

        Ok(ResetGameForNewRoundOutput {
            impostor_id,
            round_number,
        })
    }
}
