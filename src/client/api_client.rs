use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::error::ErrorResponse;
use crate::api::routes::rooms::{
    CreateRoomRequest, CreateRoomResponse, JoinRoomRequest, JoinRoomResponse, LeaveRoomResponse,
    StartGameRequest, StartGameResponse, SuccessResponse,
};
use crate::api::routes::players::UpdateScoreRequest;
use crate::api::routes::turns::{SubmitResponseRequest, TurnResponse};
use crate::api::routes::voting::{ResetRoundRequest, ResetRoundResponse, ResultsResponse, SubmitVoteRequest};
use crate::client::session::{ApplyOutcome, ClientSession};
use crate::domain::entities::{Player, Vote};
use crate::domain::value_objects::{GameStateView, ResponseEntry, RoomSnapshot};

/// Client error types
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned {status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    #[error("No player token; create or join a room first")]
    NotAuthenticated,
}

impl ClientError {
    /// Machine code of a server error
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// HTTP client for the game commands.
///
/// Holds the player token returned by create/join and sends it with every
/// room-scoped command.
#[derive(Clone)]
pub struct GameClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GameClient {
    /// `base_url` is the server root, e.g. `http://localhost:9999`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn bearer(&self) -> Result<&str, ClientError> {
        self.token.as_deref().ok_or(ClientError::NotAuthenticated)
    }

    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.json::<ErrorResponse>().await.ok();
        Err(ClientError::Api {
            status: status.as_u16(),
            code: body
                .as_ref()
                .map(|b| b.code.clone())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            message: body.map(|b| b.error).unwrap_or_default(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(self.bearer()?)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(self.bearer()?)
            .json(body)
            .send()
            .await?;
        Self::read(response).await
    }

    // ========== Room lifecycle ==========

    /// Create a room; the client keeps the host's token
    pub async fn create_room(&mut self, host_display_name: &str) -> Result<CreateRoomResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/rooms"))
            .json(&CreateRoomRequest {
                host_display_name: host_display_name.to_string(),
            })
            .send()
            .await?;
        let created: CreateRoomResponse = Self::read(response).await?;
        self.token = Some(created.token.clone());
        Ok(created)
    }

    pub async fn get_room_by_code(&self, join_code: &str) -> Result<Option<GameStateView>, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/rooms/code/{}", join_code)))
            .send()
            .await?;
        Self::read(response).await
    }

    /// Join a lobby; the client keeps the new player's token
    pub async fn join_room(&mut self, join_code: &str, display_name: &str) -> Result<JoinRoomResponse, ClientError> {
        let response = self
            .http
            .post(self.url(&format!("/rooms/code/{}/join", join_code)))
            .json(&JoinRoomRequest {
                display_name: display_name.to_string(),
            })
            .send()
            .await?;
        let joined: JoinRoomResponse = Self::read(response).await?;
        self.token = Some(joined.token.clone());
        Ok(joined)
    }

    pub async fn leave_room(&self, room_id: &str) -> Result<LeaveRoomResponse, ClientError> {
        self.post(&format!("/rooms/{}/leave", room_id), &()).await
    }

    pub async fn start_game(&self, room_id: &str, topic: &str) -> Result<StartGameResponse, ClientError> {
        let body = StartGameRequest {
            topic: topic.to_string(),
        };
        self.post(&format!("/rooms/{}/start", room_id), &body).await
    }

    pub async fn get_game_state(&self, room_id: &str) -> Result<GameStateView, ClientError> {
        self.get(&format!("/rooms/{}/state", room_id)).await
    }

    pub async fn get_players_in_room(&self, room_id: &str) -> Result<Vec<Player>, ClientError> {
        self.get(&format!("/rooms/{}/players", room_id)).await
    }

    // ========== Turns ==========

    pub async fn submit_response(&self, room_id: &str, text: &str) -> Result<TurnResponse, ClientError> {
        let body = SubmitResponseRequest {
            text: text.to_string(),
        };
        self.post(&format!("/rooms/{}/responses", room_id), &body).await
    }

    pub async fn next_turn(&self, room_id: &str) -> Result<TurnResponse, ClientError> {
        self.post(&format!("/rooms/{}/next-turn", room_id), &()).await
    }

    pub async fn get_responses(&self, room_id: &str) -> Result<Vec<ResponseEntry>, ClientError> {
        self.get(&format!("/rooms/{}/responses", room_id)).await
    }

    // ========== Voting ==========

    pub async fn start_voting_phase(&self, room_id: &str) -> Result<SuccessResponse, ClientError> {
        self.post(&format!("/rooms/{}/voting", room_id), &()).await
    }

    pub async fn submit_vote(&self, room_id: &str, voted_for_id: &str) -> Result<SuccessResponse, ClientError> {
        let body = SubmitVoteRequest {
            voted_for_id: voted_for_id.to_string(),
        };
        self.post(&format!("/rooms/{}/votes", room_id), &body).await
    }

    pub async fn get_votes(&self, room_id: &str) -> Result<Vec<Vote>, ClientError> {
        self.get(&format!("/rooms/{}/votes", room_id)).await
    }

    pub async fn calculate_results(&self, room_id: &str) -> Result<ResultsResponse, ClientError> {
        self.post(&format!("/rooms/{}/results", room_id), &()).await
    }

    pub async fn reset_game_for_new_round(
        &self,
        room_id: &str,
        new_topic: &str,
    ) -> Result<ResetRoundResponse, ClientError> {
        let body = ResetRoundRequest {
            new_topic: new_topic.to_string(),
        };
        self.post(&format!("/rooms/{}/reset", room_id), &body).await
    }

    // ========== Players ==========

    pub async fn get_player(&self, player_id: &str) -> Result<Player, ClientError> {
        self.get(&format!("/players/{}", player_id)).await
    }

    pub async fn eliminate_player(&self, player_id: &str) -> Result<SuccessResponse, ClientError> {
        self.post(&format!("/players/{}/eliminate", player_id), &()).await
    }

    pub async fn update_player_score(&self, player_id: &str, score_increase: i64) -> Result<Player, ClientError> {
        let body = UpdateScoreRequest { score_increase };
        self.post(&format!("/players/{}/score", player_id), &body).await
    }

    // ========== Snapshots ==========

    pub async fn fetch_snapshot(&self, room_id: &str) -> Result<RoomSnapshot, ClientError> {
        self.get(&format!("/rooms/{}/snapshot", room_id)).await
    }

    /// Poll the room once and feed the result to the session
    pub async fn sync(&self, session: &mut ClientSession) -> Result<ApplyOutcome, ClientError> {
        match self.fetch_snapshot(session.room_id()).await {
            Ok(snapshot) => Ok(session.apply_snapshot(snapshot)),
            Err(e) if e.code() == Some("ROOM_NOT_FOUND") => {
                let room_id = session.room_id().to_string();
                session.apply_room_closed(&room_id);
                Ok(ApplyOutcome::Stale)
            }
            Err(e) => Err(e),
        }
    }
}
