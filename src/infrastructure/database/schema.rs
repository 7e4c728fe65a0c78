use sqlx::SqlitePool;

/// Tables and indexes, applied idempotently at startup
const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS rooms (
        id TEXT PRIMARY KEY,
        join_code TEXT NOT NULL UNIQUE,
        host_player_id TEXT NOT NULL DEFAULT '',
        phase TEXT NOT NULL DEFAULT 'lobby',
        topic TEXT,
        member_ids_json TEXT NOT NULL DEFAULT '[]',
        current_turn_index INTEGER,
        round_number INTEGER,
        version INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS players (
        id TEXT PRIMARY KEY,
        room_id TEXT NOT NULL,
        display_name TEXT NOT NULL,
        is_impostor INTEGER NOT NULL DEFAULT 0,
        is_eliminated INTEGER NOT NULL DEFAULT 0,
        is_host INTEGER NOT NULL DEFAULT 0,
        score INTEGER NOT NULL DEFAULT 0,
        joined_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_players_room ON players(room_id)",
    r#"
    CREATE TABLE IF NOT EXISTS responses (
        id TEXT PRIMARY KEY,
        room_id TEXT NOT NULL,
        player_id TEXT NOT NULL,
        round_number INTEGER NOT NULL,
        text TEXT NOT NULL,
        submitted_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_responses_room_round ON responses(room_id, round_number)",
    r#"
    CREATE TABLE IF NOT EXISTS votes (
        id TEXT PRIMARY KEY,
        room_id TEXT NOT NULL,
        voter_id TEXT NOT NULL,
        voted_for_id TEXT NOT NULL,
        round_number INTEGER NOT NULL,
        UNIQUE (room_id, round_number, voter_id)
    )
    "#,
];

/// Create the schema if it does not exist yet
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in MIGRATIONS {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!("Database schema ready ({} statements)", MIGRATIONS.len());
    Ok(())
}
