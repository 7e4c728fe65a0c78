//! API Integration Tests
//!
//! Drive the HTTP routes end to end against an in-memory store.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::{Service, ServiceExt};

use impostor_backend::api;
use impostor_backend::infrastructure::app_state::AppState;
use impostor_backend::infrastructure::config::AppConfig;

/// Helper to create a test application
async fn create_test_app() -> Router {
    let state = AppState::from_config(AppConfig::in_memory())
        .await
        .expect("Failed to create app state");
    api::create_app(Arc::new(state))
}

async fn send(app: &mut Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = ServiceExt::<Request<Body>>::ready(app)
        .await
        .unwrap()
        .call(request)
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a POST request with JSON body
async fn post_json(app: &mut Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Helper to make a POST request with auth header
async fn post_json_auth(app: &mut Router, path: &str, body: Value, token: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Helper to make a GET request
async fn get(app: &mut Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Helper to make a GET request with auth header
async fn get_auth(app: &mut Router, path: &str, token: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// A room with its players, in join order (host first)
struct TestRoom {
    room_id: String,
    join_code: String,
    player_ids: Vec<String>,
    tokens: HashMap<String, String>,
}

impl TestRoom {
    fn token(&self, player_id: &str) -> &str {
        &self.tokens[player_id]
    }

    fn host_token(&self) -> &str {
        self.token(&self.player_ids[0])
    }
}

async fn create_room(app: &mut Router, guests: &[&str]) -> TestRoom {
    let (status, body) = post_json(app, "/api/rooms", json!({ "hostDisplayName": "Alice" })).await;
    assert_eq!(status, StatusCode::CREATED);

    let host_id = body["hostPlayerId"].as_str().unwrap().to_string();
    let mut room = TestRoom {
        room_id: body["roomId"].as_str().unwrap().to_string(),
        join_code: body["joinCode"].as_str().unwrap().to_string(),
        player_ids: vec![host_id.clone()],
        tokens: HashMap::from([(host_id, body["token"].as_str().unwrap().to_string())]),
    };

    for guest in guests {
        let path = format!("/api/rooms/code/{}/join", room.join_code);
        let (status, body) = post_json(app, &path, json!({ "displayName": guest })).await;
        assert_eq!(status, StatusCode::CREATED);

        let player_id = body["playerId"].as_str().unwrap().to_string();
        room.tokens
            .insert(player_id.clone(), body["token"].as_str().unwrap().to_string());
        room.player_ids.push(player_id);
    }

    room
}

/// Three-player room with the game started; returns the impostor id too
async fn started_room(app: &mut Router) -> (TestRoom, String) {
    let room = create_room(app, &["Bob", "Carol"]).await;
    let path = format!("/api/rooms/{}/start", room.room_id);
    let (status, body) = post_json_auth(app, &path, json!({ "topic": "Beaches" }), room.host_token()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let impostor = body["impostorId"].as_str().unwrap().to_string();
    (room, impostor)
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let mut app = create_test_app().await;
    let (status, body) = get(&mut app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// ============================================================================
// Rooms
// ============================================================================

#[tokio::test]
async fn test_create_room() {
    let mut app = create_test_app().await;
    let room = create_room(&mut app, &[]).await;

    assert_eq!(room.join_code.len(), 6);
    assert!(!room.host_token().is_empty());

    let path = format!("/api/rooms/{}/state", room.room_id);
    let (status, body) = get_auth(&mut app, &path, room.host_token()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["room"]["phase"], "lobby");
    assert_eq!(body["room"]["hostPlayerId"], room.player_ids[0].as_str());
    assert_eq!(body["players"][0]["displayName"], "Alice");
    assert_eq!(body["players"][0]["isHost"], true);
    assert_eq!(body["currentPlayer"], Value::Null);
}

#[tokio::test]
async fn test_create_room_blank_name() {
    let mut app = create_test_app().await;
    let (status, body) = post_json(&mut app, "/api/rooms", json!({ "hostDisplayName": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_room_by_code() {
    let mut app = create_test_app().await;
    let room = create_room(&mut app, &["Bob"]).await;

    let path = format!("/api/rooms/code/{}", room.join_code.to_lowercase());
    let (status, body) = get(&mut app, &path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["room"]["id"], room.room_id.as_str());
    assert_eq!(body["players"].as_array().unwrap().len(), 2);

    let (status, body) = get(&mut app, "/api/rooms/code/ZZZZZZ").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_join_unknown_room() {
    let mut app = create_test_app().await;
    let (status, body) = post_json(
        &mut app,
        "/api/rooms/code/NOPE22/join",
        json!({ "displayName": "Bob" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ROOM_NOT_FOUND");
}

#[tokio::test]
async fn test_join_started_room() {
    let mut app = create_test_app().await;
    let (room, _) = started_room(&mut app).await;

    let path = format!("/api/rooms/code/{}/join", room.join_code);
    let (status, body) = post_json(&mut app, &path, json!({ "displayName": "Dave" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_PHASE");
}

#[tokio::test]
async fn test_missing_token() {
    let mut app = create_test_app().await;
    let room = create_room(&mut app, &[]).await;

    let path = format!("/api/rooms/{}/state", room.room_id);
    let (status, body) = get(&mut app, &path).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = get_auth(&mut app, &path, "not-a-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_other_room() {
    let mut app = create_test_app().await;
    let first = create_room(&mut app, &[]).await;
    let second = create_room(&mut app, &[]).await;

    let path = format!("/api/rooms/{}/state", second.room_id);
    let (status, body) = get_auth(&mut app, &path, first.host_token()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_IN_ROOM");

    let path = format!("/api/players/{}", second.player_ids[0]);
    let (status, _) = get_auth(&mut app, &path, first.host_token()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_start_game_needs_three_players() {
    let mut app = create_test_app().await;
    let room = create_room(&mut app, &["Bob"]).await;

    let path = format!("/api/rooms/{}/start", room.room_id);
    let (status, body) = post_json_auth(&mut app, &path, json!({ "topic": "Beaches" }), room.host_token()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_PLAYERS");
}

#[tokio::test]
async fn test_only_host_starts_game() {
    let mut app = create_test_app().await;
    let room = create_room(&mut app, &["Bob", "Carol"]).await;

    let path = format!("/api/rooms/{}/start", room.room_id);
    let guest_token = room.token(&room.player_ids[1]).to_string();
    let (status, body) = post_json_auth(&mut app, &path, json!({ "topic": "Beaches" }), &guest_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_leave_room() {
    let mut app = create_test_app().await;
    let room = create_room(&mut app, &["Bob"]).await;
    let leave = format!("/api/rooms/{}/leave", room.room_id);

    let (status, body) = post_json_auth(&mut app, &leave, json!({}), room.host_token()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roomClosed"], false);
    assert_eq!(body["newHostId"], room.player_ids[1].as_str());

    let bob_token = room.token(&room.player_ids[1]).to_string();
    let (status, body) = post_json_auth(&mut app, &leave, json!({}), &bob_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roomClosed"], true);

    let state = format!("/api/rooms/{}/state", room.room_id);
    let (status, body) = get_auth(&mut app, &state, &bob_token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ROOM_NOT_FOUND");
}

// ============================================================================
// Turns
// ============================================================================

#[tokio::test]
async fn test_submit_response_in_lobby() {
    let mut app = create_test_app().await;
    let room = create_room(&mut app, &["Bob", "Carol"]).await;

    let path = format!("/api/rooms/{}/responses", room.room_id);
    let (status, body) = post_json_auth(&mut app, &path, json!({ "text": "sand" }), room.host_token()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_PHASE");
}

#[tokio::test]
async fn test_turn_order() {
    let mut app = create_test_app().await;
    let (room, _) = started_room(&mut app).await;
    let path = format!("/api/rooms/{}/responses", room.room_id);

    let bob_token = room.token(&room.player_ids[1]).to_string();
    let (status, body) = post_json_auth(&mut app, &path, json!({ "text": "sun" }), &bob_token).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "NOT_YOUR_TURN");

    let (status, body) = post_json_auth(&mut app, &path, json!({ "text": "sand" }), room.host_token()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentTurnIndex"], 1);
    assert_eq!(body["roundNumber"], 1);
    assert_eq!(body["lapCompleted"], false);

    let (status, body) = post_json_auth(&mut app, &path, json!({ "text": "sun" }), &bob_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentTurnIndex"], 2);

    let (status, body) = get_auth(&mut app, &path, room.host_token()).await;
    assert_eq!(status, StatusCode::OK);
    let responses = body.as_array().unwrap();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["playerName"], "Alice");
    assert_eq!(responses[0]["text"], "sand");
    assert_eq!(responses[1]["playerName"], "Bob");
}

#[tokio::test]
async fn test_next_turn_wraps() {
    let mut app = create_test_app().await;
    let (room, _) = started_room(&mut app).await;
    let path = format!("/api/rooms/{}/next-turn", room.room_id);

    let mut last = Value::Null;
    for _ in 0..3 {
        let (status, body) = post_json_auth(&mut app, &path, json!({}), room.host_token()).await;
        assert_eq!(status, StatusCode::OK);
        last = body;
    }
    assert_eq!(last["currentTurnIndex"], 0);
    assert_eq!(last["roundNumber"], 2);
    assert_eq!(last["lapCompleted"], true);
}

// ============================================================================
// Voting
// ============================================================================

#[tokio::test]
async fn test_full_round() {
    let mut app = create_test_app().await;
    let (room, impostor) = started_room(&mut app).await;

    let voting = format!("/api/rooms/{}/voting", room.room_id);
    let (status, _) = post_json_auth(&mut app, &voting, json!({}), room.host_token()).await;
    assert_eq!(status, StatusCode::OK);

    let votes = format!("/api/rooms/{}/votes", room.room_id);
    for voter in room.player_ids.iter().filter(|id| **id != impostor) {
        let (status, body) = post_json_auth(
            &mut app,
            &votes,
            json!({ "votedForId": impostor }),
            room.token(voter),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    let (status, body) = get_auth(&mut app, &votes, room.host_token()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let results = format!("/api/rooms/{}/results", room.room_id);
    let (status, body) = post_json_auth(&mut app, &results, json!({}), room.host_token()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["votedPlayerId"], impostor.as_str());
    assert_eq!(body["isImpostorCaught"], true);
    assert_eq!(body["voteCounts"][impostor.as_str()], 2);

    let players = format!("/api/rooms/{}/players", room.room_id);
    let (_, body) = get_auth(&mut app, &players, room.host_token()).await;
    for player in body.as_array().unwrap() {
        if player["id"] == impostor.as_str() {
            assert_eq!(player["isEliminated"], true);
            assert_eq!(player["score"], 0);
        } else {
            assert_eq!(player["score"], 2);
        }
    }

    // Two players remain, not enough for another round
    let reset = format!("/api/rooms/{}/reset", room.room_id);
    let (status, body) = post_json_auth(&mut app, &reset, json!({ "newTopic": "Mountains" }), room.host_token()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_PLAYERS");
}

#[tokio::test]
async fn test_results_without_votes() {
    let mut app = create_test_app().await;
    let (room, _) = started_room(&mut app).await;

    let voting = format!("/api/rooms/{}/voting", room.room_id);
    post_json_auth(&mut app, &voting, json!({}), room.host_token()).await;

    let results = format!("/api/rooms/{}/results", room.room_id);
    let (status, body) = post_json_auth(&mut app, &results, json!({}), room.host_token()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "NO_VOTES_CAST");
}

#[tokio::test]
async fn test_vote_before_voting_phase() {
    let mut app = create_test_app().await;
    let (room, _) = started_room(&mut app).await;

    let votes = format!("/api/rooms/{}/votes", room.room_id);
    let (status, body) = post_json_auth(
        &mut app,
        &votes,
        json!({ "votedForId": room.player_ids[1] }),
        room.host_token(),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_PHASE");
}

// ============================================================================
// Players and snapshots
// ============================================================================

#[tokio::test]
async fn test_player_score_and_elimination() {
    let mut app = create_test_app().await;
    let room = create_room(&mut app, &["Bob"]).await;
    let bob = room.player_ids[1].clone();

    let score = format!("/api/players/{}/score", bob);
    let (status, body) = post_json_auth(&mut app, &score, json!({ "scoreIncrease": 4 }), room.host_token()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 4);

    let (_, body) = post_json_auth(&mut app, &score, json!({ "scoreIncrease": -10 }), room.host_token()).await;
    assert_eq!(body["score"], 0);

    let eliminate = format!("/api/players/{}/eliminate", bob);
    let (status, _) = post_json_auth(&mut app, &eliminate, json!({}), room.host_token()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_auth(&mut app, &format!("/api/players/{}", bob), room.host_token()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isEliminated"], true);

    let (status, body) = get_auth(&mut app, "/api/players/nobody", room.host_token()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PLAYER_NOT_FOUND");
}

#[tokio::test]
async fn test_snapshot_version_grows() {
    let mut app = create_test_app().await;
    let (room, _) = started_room(&mut app).await;
    let snapshot = format!("/api/rooms/{}/snapshot", room.room_id);

    let (status, before) = get_auth(&mut app, &snapshot, room.host_token()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before["state"]["room"]["phase"], "game");

    let responses = format!("/api/rooms/{}/responses", room.room_id);
    post_json_auth(&mut app, &responses, json!({ "text": "sand" }), room.host_token()).await;

    let (_, after) = get_auth(&mut app, &snapshot, room.host_token()).await;
    assert!(after["version"].as_i64().unwrap() > before["version"].as_i64().unwrap());
    assert_eq!(after["responses"].as_array().unwrap().len(), 1);
    assert_eq!(after["state"]["currentPlayer"]["id"], room.player_ids[1].as_str());
}

#[tokio::test]
async fn test_event_stream_requires_token() {
    let mut app = create_test_app().await;
    let room = create_room(&mut app, &[]).await;

    let path = format!("/api/rooms/{}/events", room.room_id);
    let (status, body) = get(&mut app, &path).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}
