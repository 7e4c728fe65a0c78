//! Client Integration Tests
//!
//! Runs the server on an ephemeral port and drives it through `GameClient`,
//! keeping one `ClientSession` per player in sync by polling.

use std::sync::Arc;

use impostor_backend::api;
use impostor_backend::client::{ApplyOutcome, ClientSession, GameClient};
use impostor_backend::domain::entities::GamePhase;
use impostor_backend::infrastructure::app_state::AppState;
use impostor_backend::infrastructure::config::AppConfig;

async fn spawn_server() -> String {
    let state = AppState::from_config(AppConfig::in_memory())
        .await
        .expect("Failed to create app state");
    let app = api::create_app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

struct Seat {
    client: GameClient,
    session: ClientSession,
}

impl Seat {
    fn id(&self) -> &str {
        self.session.player_id()
    }
}

/// Host "Alice" plus the given guests, each with a synced session
async fn seat_players(base_url: &str, guests: &[&str]) -> Vec<Seat> {
    let mut host = GameClient::new(base_url);
    let created = host.create_room("Alice").await.unwrap();

    let mut seats = vec![Seat {
        client: host,
        session: ClientSession::new(&created.room_id, &created.host_player_id),
    }];

    for guest in guests {
        let mut client = GameClient::new(base_url);
        let joined = client.join_room(&created.join_code, guest).await.unwrap();
        seats.push(Seat {
            client,
            session: ClientSession::new(&joined.room_id, &joined.player_id),
        });
    }

    sync_all(&mut seats).await;
    seats
}

async fn sync_all(seats: &mut [Seat]) {
    for seat in seats.iter_mut() {
        seat.client.sync(&mut seat.session).await.unwrap();
    }
}

#[tokio::test]
async fn test_sessions_follow_a_full_round() {
    let base_url = spawn_server().await;
    let mut seats = seat_players(&base_url, &["Bob", "Carol"]).await;
    let room_id = seats[0].session.room_id().to_string();

    for seat in &seats {
        let view = seat.session.view().unwrap();
        assert_eq!(view.phase, GamePhase::Lobby);
        assert_eq!(view.players.len(), 3);
        assert_eq!(view.am_i_host, seat.id() == seats[0].id());
    }

    // Nothing changed since the last poll
    let outcome = { let s = &mut seats[0]; s.client.sync(&mut s.session) }.await.unwrap();
    assert_eq!(outcome, ApplyOutcome::Stale);

    let started = seats[0].client.start_game(&room_id, "Beaches").await.unwrap();
    sync_all(&mut seats).await;

    for seat in &seats {
        let view = seat.session.view().unwrap();
        assert_eq!(view.phase, GamePhase::Game);
        assert_eq!(view.am_i_impostor, seat.id() == started.impostor_id);
        if view.am_i_impostor {
            assert_eq!(view.visible_topic, None);
        } else {
            assert_eq!(view.visible_topic.as_deref(), Some("Beaches"));
        }
        assert_eq!(view.is_my_turn, seat.id() == seats[0].id());
    }

    // Out of turn
    let err = seats[1].client.submit_response(&room_id, "sun").await.unwrap_err();
    assert_eq!(err.code(), Some("NOT_YOUR_TURN"));

    for i in 0..3 {
        let advance = seats[i].client.submit_response(&room_id, "sand").await.unwrap();
        sync_all(&mut seats).await;
        if i < 2 {
            assert!(seats[i + 1].session.view().unwrap().is_my_turn);
            assert_eq!(advance.round_number, 1);
        } else {
            assert!(advance.lap_completed);
            assert_eq!(advance.round_number, 2);
        }
    }

    seats[0].client.start_voting_phase(&room_id).await.unwrap();
    for i in 0..3 {
        if seats[i].id() != started.impostor_id {
            seats[i].client.submit_vote(&room_id, &started.impostor_id).await.unwrap();
        }
    }
    sync_all(&mut seats).await;

    let host_view = seats[0].session.view().unwrap();
    assert_eq!(host_view.phase, GamePhase::Voting);
    assert_eq!(host_view.vote_tally.get(&started.impostor_id), Some(&2));
    assert_eq!(host_view.votes_outstanding, 1);

    let results = seats[0].client.calculate_results(&room_id).await.unwrap();
    assert!(results.is_impostor_caught);
    sync_all(&mut seats).await;

    for seat in &seats {
        let view = seat.session.view().unwrap();
        assert_eq!(view.phase, GamePhase::Results);
        assert_eq!(view.visible_topic.as_deref(), Some("Beaches"));
        let me = view.my_player.as_ref().unwrap();
        if me.id == started.impostor_id {
            assert!(view.am_i_eliminated);
            assert_eq!(me.score, 0);
        } else {
            assert_eq!(me.score, 2);
        }
    }
}

#[tokio::test]
async fn test_session_closes_when_room_empties() {
    let base_url = spawn_server().await;
    let mut seats = seat_players(&base_url, &["Bob"]).await;
    let room_id = seats[0].session.room_id().to_string();

    let left = seats[0].client.leave_room(&room_id).await.unwrap();
    assert!(!left.room_closed);

    { let s = &mut seats[1]; s.client.sync(&mut s.session) }.await.unwrap();
    assert!(seats[1].session.view().unwrap().am_i_host);

    let left = seats[1].client.leave_room(&room_id).await.unwrap();
    assert!(left.room_closed);

    let outcome = { let s = &mut seats[1]; s.client.sync(&mut s.session) }.await.unwrap();
    assert_eq!(outcome, ApplyOutcome::Stale);
    assert!(seats[1].session.is_closed());
    assert!(seats[1].session.view().is_none());
}

#[tokio::test]
async fn test_commands_need_a_token() {
    let base_url = spawn_server().await;
    let client = GameClient::new(&base_url);
    let err = client.get_game_state("room").await.unwrap_err();
    assert!(err.code().is_none());
}

#[tokio::test]
async fn test_event_stream_opens_with_snapshot() {
    let base_url = spawn_server().await;
    let seats = seat_players(&base_url, &[]).await;
    let room_id = seats[0].session.room_id();
    let token = seats[0].client.token().unwrap();

    let mut response = reqwest::Client::new()
        .get(format!("{}/api/rooms/{}/events?token={}", base_url, room_id, token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let mut received = String::new();
    while !received.contains("\n\n") {
        let chunk = response.chunk().await.unwrap().expect("stream ended early");
        received.push_str(&String::from_utf8_lossy(&chunk));
    }

    assert!(received.starts_with("event: snapshot"));
    assert!(received.contains("\"action\":\"subscribed\""));
    assert!(received.contains(room_id));
}
