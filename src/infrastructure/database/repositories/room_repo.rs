use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::domain::entities::{GamePhase, Player, Response, Room, Vote};
use crate::domain::repositories::{
    AddMember, AdvanceTurn, ApplyResults, BeginRound, CastVote, ChangePhase, CloseRoom,
    CreateRoomRecord, RecordResponse, RemoveMember, RepositoryError, RoomRepository,
};

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

/// Map a unique-index violation to `AlreadyExists`
fn insert_error(e: sqlx::Error, key: &str) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::AlreadyExists(key.to_string())
        }
        _ => db_error(e),
    }
}

fn members_to_json(member_ids: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(member_ids).map_err(|e| RepositoryError::Database(e.to_string()))
}

/// SQLite implementation of RoomRepository
///
/// Every command runs in one transaction that first bumps the room version.
/// Most commands compare-and-swap the version, so one computed from a stale
/// read commits nothing. Joins and votes re-check the phase instead; SQLite
/// serializes writers, so they queue rather than conflict.
pub struct SqliteRoomRepository {
    pool: SqlitePool,
}

impl SqliteRoomRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_room(row: &SqliteRow) -> Room {
        let phase_str: String = row.get("phase");
        let members_json: String = row.get("member_ids_json");

        Room {
            id: row.get("id"),
            join_code: row.get("join_code"),
            host_player_id: row.get("host_player_id"),
            phase: GamePhase::from_str(&phase_str).unwrap_or(GamePhase::Lobby),
            topic: row.get("topic"),
            member_ids: serde_json::from_str(&members_json).unwrap_or_default(),
            current_turn_index: row
                .get::<Option<i64>, _>("current_turn_index")
                .map(|i| i as u32),
            round_number: row.get::<Option<i64>, _>("round_number").map(|r| r as u32),
            version: row.get("version"),
            created_at: row.get("created_at"),
        }
    }

    fn row_to_player(row: &SqliteRow) -> Player {
        Player {
            id: row.get("id"),
            room_id: row.get("room_id"),
            display_name: row.get("display_name"),
            is_impostor: row.get("is_impostor"),
            is_eliminated: row.get("is_eliminated"),
            is_host: row.get("is_host"),
            score: row.get("score"),
            joined_at: row.get("joined_at"),
        }
    }

    fn row_to_response(row: &SqliteRow) -> Response {
        Response {
            id: row.get("id"),
            room_id: row.get("room_id"),
            player_id: row.get("player_id"),
            round_number: row.get::<i64, _>("round_number") as u32,
            text: row.get("text"),
            submitted_at: row.get("submitted_at"),
        }
    }

    fn row_to_vote(row: &SqliteRow) -> Vote {
        Vote {
            id: row.get("id"),
            room_id: row.get("room_id"),
            voter_id: row.get("voter_id"),
            voted_for_id: row.get("voted_for_id"),
            round_number: row.get::<i64, _>("round_number") as u32,
        }
    }

    /// Compare-and-swap on the room version
    async fn bump_version(
        tx: &mut Transaction<'_, Sqlite>,
        room_id: &str,
        expected_version: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE rooms SET version = version + 1 WHERE id = ? AND version = ?")
            .bind(room_id)
            .bind(expected_version)
            .execute(&mut **tx)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            tracing::debug!(room_id, expected_version, "room version moved, rejecting command");
            return Err(RepositoryError::Conflict(room_id.to_string()));
        }
        Ok(())
    }

    /// Bump the version of a room that must still be in `phase`, whatever
    /// version the caller read. Returns the room's current round.
    async fn bump_in_phase(
        tx: &mut Transaction<'_, Sqlite>,
        room_id: &str,
        phase: GamePhase,
    ) -> Result<u32, RepositoryError> {
        let round: Option<Option<i64>> = sqlx::query_scalar(
            "UPDATE rooms SET version = version + 1 WHERE id = ? AND phase = ? RETURNING round_number",
        )
        .bind(room_id)
        .bind(phase.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_error)?;

        if let Some(round) = round {
            return Ok(round.map(|r| r as u32).unwrap_or(1));
        }

        let actual: Option<String> = sqlx::query_scalar("SELECT phase FROM rooms WHERE id = ?")
            .bind(room_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_error)?;

        match actual.as_deref().and_then(GamePhase::from_str) {
            Some(actual) => Err(RepositoryError::PhaseMoved(actual)),
            None => Err(RepositoryError::NotFound(room_id.to_string())),
        }
    }

    /// Bump the version of whatever room the player belongs to.
    /// Returns false if the player does not exist.
    async fn touch_player_room(
        tx: &mut Transaction<'_, Sqlite>,
        player_id: &str,
    ) -> Result<bool, RepositoryError> {
        let room_id: Option<String> = sqlx::query_scalar("SELECT room_id FROM players WHERE id = ?")
            .bind(player_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_error)?;

        let Some(room_id) = room_id else {
            return Ok(false);
        };

        sqlx::query("UPDATE rooms SET version = version + 1 WHERE id = ?")
            .bind(&room_id)
            .execute(&mut **tx)
            .await
            .map_err(db_error)?;
        Ok(true)
    }

    async fn insert_player(conn: &mut SqliteConnection, player: &Player) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO players (id, room_id, display_name, is_impostor, is_eliminated, is_host, score, joined_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&player.id)
        .bind(&player.room_id)
        .bind(&player.display_name)
        .bind(player.is_impostor)
        .bind(player.is_eliminated)
        .bind(player.is_host)
        .bind(player.score)
        .bind(player.joined_at)
        .execute(conn)
        .await
        .map_err(|e| insert_error(e, &player.id))?;
        Ok(())
    }

    async fn write_turn(conn: &mut SqliteConnection, command: &AdvanceTurn) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE rooms SET current_turn_index = ?, round_number = ? WHERE id = ?")
            .bind(command.current_turn_index as i64)
            .bind(command.round_number as i64)
            .bind(&command.room_id)
            .execute(conn)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

#[async_trait]
impl RoomRepository for SqliteRoomRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Room>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM rooms WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.as_ref().map(Self::row_to_room))
    }

    async fn find_by_join_code(&self, code: &str) -> Result<Option<Room>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM rooms WHERE join_code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.as_ref().map(Self::row_to_room))
    }

    async fn find_player(&self, id: &str) -> Result<Option<Player>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM players WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.as_ref().map(Self::row_to_player))
    }

    async fn find_players_by_ids(&self, ids: &[String]) -> Result<Vec<Player>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM players WHERE id IN ({})", placeholders);
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(db_error)?;
        Ok(rows.iter().map(Self::row_to_player).collect())
    }

    async fn find_players_in_room(&self, room_id: &str) -> Result<Vec<Player>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM players WHERE room_id = ? ORDER BY joined_at ASC, rowid ASC")
            .bind(room_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.iter().map(Self::row_to_player).collect())
    }

    async fn find_responses(
        &self,
        room_id: &str,
        round_number: u32,
    ) -> Result<Vec<Response>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM responses WHERE room_id = ? AND round_number = ? ORDER BY submitted_at ASC, rowid ASC",
        )
        .bind(room_id)
        .bind(round_number as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.iter().map(Self::row_to_response).collect())
    }

    async fn find_votes(&self, room_id: &str, round_number: u32) -> Result<Vec<Vote>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM votes WHERE room_id = ? AND round_number = ? ORDER BY rowid ASC")
            .bind(room_id)
            .bind(round_number as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.iter().map(Self::row_to_vote).collect())
    }

    async fn create_room(&self, record: &CreateRoomRecord) -> Result<(), RepositoryError> {
        let room = &record.room;
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        // Room first, with no members; the host needs a room to point at
        sqlx::query(
            r#"
            INSERT INTO rooms (id, join_code, host_player_id, phase, topic, member_ids_json, current_turn_index, round_number, version, created_at)
            VALUES (?, ?, '', ?, NULL, '[]', NULL, NULL, 0, ?)
            "#,
        )
        .bind(&room.id)
        .bind(&room.join_code)
        .bind(room.phase.as_str())
        .bind(room.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| insert_error(e, &room.join_code))?;

        Self::insert_player(&mut tx, &record.host).await?;

        let members = members_to_json(std::slice::from_ref(&record.host.id))?;
        sqlx::query(
            "UPDATE rooms SET host_player_id = ?, member_ids_json = ?, version = version + 1 WHERE id = ?",
        )
        .bind(&record.host.id)
        .bind(members)
        .bind(&room.id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn add_member(&self, command: &AddMember) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        Self::bump_in_phase(&mut tx, &command.room_id, GamePhase::Lobby).await?;

        let members_json: String = sqlx::query_scalar("SELECT member_ids_json FROM rooms WHERE id = ?")
            .bind(&command.room_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error)?;
        let mut member_ids: Vec<String> = serde_json::from_str(&members_json).unwrap_or_default();
        if !member_ids.contains(&command.player.id) {
            member_ids.push(command.player.id.clone());
        }

        Self::insert_player(&mut tx, &command.player).await?;

        sqlx::query("UPDATE rooms SET member_ids_json = ? WHERE id = ?")
            .bind(members_to_json(&member_ids)?)
            .bind(&command.room_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn remove_member(&self, command: &RemoveMember) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        Self::bump_version(&mut tx, &command.room_id, command.expected_version).await?;

        // Host hand-over is written before the membership list
        if let Some(new_host_id) = &command.new_host_id {
            sqlx::query("UPDATE players SET is_host = 1 WHERE id = ?")
                .bind(new_host_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
            sqlx::query("UPDATE rooms SET host_player_id = ? WHERE id = ?")
                .bind(new_host_id)
                .bind(&command.room_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        sqlx::query("UPDATE rooms SET member_ids_json = ?, current_turn_index = ? WHERE id = ?")
            .bind(members_to_json(&command.member_ids)?)
            .bind(command.current_turn_index.map(|i| i as i64))
            .bind(&command.room_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        sqlx::query("DELETE FROM players WHERE id = ?")
            .bind(&command.player_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn close_room(&self, command: &CloseRoom) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        Self::bump_version(&mut tx, &command.room_id, command.expected_version).await?;

        sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(&command.room_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        sqlx::query("DELETE FROM players WHERE id = ?")
            .bind(&command.player_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn begin_round(&self, command: &BeginRound) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        Self::bump_version(&mut tx, &command.room_id, command.expected_version).await?;

        for player_id in &command.pool {
            sqlx::query("UPDATE players SET is_impostor = ? WHERE id = ? AND room_id = ?")
                .bind(*player_id == command.impostor_id)
                .bind(player_id)
                .bind(&command.room_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        sqlx::query(
            "UPDATE rooms SET phase = ?, topic = ?, round_number = ?, current_turn_index = 0 WHERE id = ?",
        )
        .bind(GamePhase::Game.as_str())
        .bind(&command.topic)
        .bind(command.round_number as i64)
        .bind(&command.room_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn advance_turn(&self, command: &AdvanceTurn) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        Self::bump_version(&mut tx, &command.room_id, command.expected_version).await?;
        Self::write_turn(&mut tx, command).await?;
        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn record_response(&self, command: &RecordResponse) -> Result<(), RepositoryError> {
        let advance = &command.advance;
        let response = &command.response;
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        Self::bump_version(&mut tx, &advance.room_id, advance.expected_version).await?;

        sqlx::query(
            r#"
            INSERT INTO responses (id, room_id, player_id, round_number, text, submitted_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&response.id)
        .bind(&response.room_id)
        .bind(&response.player_id)
        .bind(response.round_number as i64)
        .bind(&response.text)
        .bind(response.submitted_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| insert_error(e, &response.id))?;

        Self::write_turn(&mut tx, advance).await?;

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn change_phase(&self, command: &ChangePhase) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        Self::bump_version(&mut tx, &command.room_id, command.expected_version).await?;

        sqlx::query("UPDATE rooms SET phase = ? WHERE id = ?")
            .bind(command.phase.as_str())
            .bind(&command.room_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn cast_vote(&self, command: &CastVote) -> Result<(), RepositoryError> {
        let vote = &command.vote;
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let round = Self::bump_in_phase(&mut tx, &vote.room_id, GamePhase::Voting).await?;

        sqlx::query(
            r#"
            INSERT INTO votes (id, room_id, voter_id, voted_for_id, round_number)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(room_id, round_number, voter_id) DO UPDATE SET
                voted_for_id = excluded.voted_for_id
            "#,
        )
        .bind(&vote.id)
        .bind(&vote.room_id)
        .bind(&vote.voter_id)
        .bind(&vote.voted_for_id)
        .bind(round as i64)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn apply_results(&self, command: &ApplyResults) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        Self::bump_version(&mut tx, &command.room_id, command.expected_version).await?;

        sqlx::query("UPDATE players SET is_eliminated = 1 WHERE id = ?")
            .bind(&command.eliminated_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        for (player_id, points) in &command.score_awards {
            sqlx::query("UPDATE players SET score = MAX(score + ?, 0) WHERE id = ?")
                .bind(*points)
                .bind(player_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        sqlx::query("UPDATE rooms SET phase = ? WHERE id = ?")
            .bind(GamePhase::Results.as_str())
            .bind(&command.room_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn eliminate_player(&self, player_id: &str) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        if !Self::touch_player_room(&mut tx, player_id).await? {
            return Ok(false);
        }

        sqlx::query("UPDATE players SET is_eliminated = 1 WHERE id = ?")
            .bind(player_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(true)
    }

    async fn add_to_score(&self, player_id: &str, delta: i64) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        if !Self::touch_player_room(&mut tx, player_id).await? {
            return Ok(false);
        }

        sqlx::query("UPDATE players SET score = MAX(score + ?, 0) WHERE id = ?")
            .bind(delta)
            .bind(player_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(true)
    }
}
