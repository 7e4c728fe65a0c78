use std::fmt;

use crate::domain::entities::{GamePhase, Player, Room};
use crate::domain::repositories::{RepositoryError, RoomRepository};

/// Kind of record a lookup failed to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Room,
    Player,
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Room => f.write_str("Room"),
            Missing::Player => f.write_str("Player"),
        }
    }
}

/// Error shared by every game use case
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("{0} not found")]
    NotFound(Missing),
    #[error("Operation not allowed in phase {actual} (expected {expected})")]
    InvalidPhase { expected: GamePhase, actual: GamePhase },
    #[error("Only the host can do this")]
    Forbidden,
    #[error("It is not your turn")]
    NotYourTurn,
    #[error("Not enough players (need {required}, have {actual})")]
    InsufficientPlayers { required: usize, actual: usize },
    #[error("No votes have been cast this round")]
    NoVotesCast,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub(crate) fn require_phase(room: &Room, expected: GamePhase) -> Result<(), GameError> {
    if room.phase != expected {
        return Err(GameError::InvalidPhase {
            expected,
            actual: room.phase,
        });
    }
    Ok(())
}

/// Error mapping for phase-guarded writes (joins and votes)
pub(crate) fn guarded_write_error(expected: GamePhase) -> impl FnOnce(RepositoryError) -> GameError {
    move |e| match e {
        RepositoryError::PhaseMoved(actual) => GameError::InvalidPhase { expected, actual },
        RepositoryError::NotFound(_) => GameError::NotFound(Missing::Room),
        e => GameError::Repository(e),
    }
}

pub(crate) async fn load_room<R: RoomRepository>(repo: &R, room_id: &str) -> Result<Room, GameError> {
    repo.find_by_id(room_id)
        .await?
        .ok_or(GameError::NotFound(Missing::Room))
}

pub(crate) async fn load_player<R: RoomRepository>(repo: &R, player_id: &str) -> Result<Player, GameError> {
    repo.find_player(player_id)
        .await?
        .ok_or(GameError::NotFound(Missing::Player))
}

/// Host check against the stored player flag
pub(crate) async fn require_host<R: RoomRepository>(
    repo: &R,
    room: &Room,
    player_id: &str,
) -> Result<(), GameError> {
    let player = repo.find_player(player_id).await?;
    match player {
        Some(p) if p.is_host && p.room_id == room.id => Ok(()),
        _ => Err(GameError::Forbidden),
    }
}
