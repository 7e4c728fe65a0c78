use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::{load_room, require_phase, GameError, Missing};
use crate::domain::entities::GamePhase;
use crate::domain::repositories::{ApplyResults, RoomRepository};
use crate::domain::services::{active_impostor, most_voted, score_round, tally_votes};
use crate::domain::value_objects::GameRules;

/// Calculate results input
pub struct CalculateResultsInput {
    pub room_id: String,
}

/// Calculate results output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculateResultsOutput {
    pub voted_player_id: String,
    pub is_impostor_caught: bool,
    /// Votes received per player id
    pub vote_counts: BTreeMap<String, u32>,
}

/// Close the vote: eliminate the most voted player, award the round
/// bonus and move the room to results.
///
/// Vote completeness is the caller's concern; one vote is enough.
pub struct CalculateResults<R: RoomRepository> {
    room_repo: Arc<R>,
    rules: GameRules,
}

impl<R: RoomRepository> CalculateResults<R> {
    pub fn new(room_repo: Arc<R>, rules: GameRules) -> Self {
        Self { room_repo, rules }
    }

    pub async fn execute(&self, input: CalculateResultsInput) -> Result<CalculateResultsOutput, GameError> {
        let repo = self.room_repo.as_ref();
        let room = load_room(repo, &input.room_id).await?;

        require_phase(&room, GamePhase::Voting)?;

        let votes = repo.find_votes(&room.id, room.current_round()).await?;
        let vote_counts = tally_votes(&votes);
        let voted_player_id = match most_voted(&vote_counts) {
            Some((player_id, _)) => player_id.to_string(),
            None => return Err(GameError::NoVotesCast),
        };

        let players = repo.find_players_in_room(&room.id).await?;
        // Votes are not checked against the room; the winner may have left
        if !players.iter().any(|p| p.id == voted_player_id) {
            return Err(GameError::NotFound(Missing::Player));
        }
        let impostor_id = active_impostor(&players).map(|p| p.id.clone());
        let is_impostor_caught = impostor_id.as_deref() == Some(voted_player_id.as_str());

        let awards = score_round(&players, impostor_id.as_deref(), is_impostor_caught, &self.rules);

        repo.apply_results(&ApplyResults {
            room_id: room.id.clone(),
            expected_version: room.version,
            eliminated_id: voted_player_id.clone(),
            score_awards: awards.into_iter().map(|a| (a.player_id, a.points)).collect(),
        })
        .await?;

        tracing::info!(
            room_id = %room.id,
            round = room.current_round(),
            caught = is_impostor_caught,
            "Vote closed, {} eliminated",
            voted_player_id
        );

        Ok(CalculateResultsOutput {
            voted_player_id,
            is_impostor_caught,
            vote_counts,
        })
    }
}
