//! Per-client derived view of a room snapshot.
//!
//! Everything here is recomputed from the snapshot alone, so two clients
//! holding the same snapshot always agree.

use std::collections::BTreeMap;

use crate::domain::entities::{GamePhase, Player};
use crate::domain::services::tally_votes;
use crate::domain::value_objects::{ResponseEntry, RoomSnapshot};

/// What one player's screen shows for a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientView {
    pub room_id: String,
    pub join_code: String,
    pub phase: GamePhase,
    pub round_number: Option<u32>,
    pub my_player: Option<Player>,
    /// Player at the turn index, `None` when unset or out of range
    pub current_player: Option<Player>,
    pub is_my_turn: bool,
    pub am_i_impostor: bool,
    pub am_i_host: bool,
    pub am_i_eliminated: bool,
    /// The impostor does not see the topic until results
    pub visible_topic: Option<String>,
    pub players: Vec<Player>,
    pub responses: Vec<ResponseEntry>,
    /// Voter id to target id
    pub votes_by_voter: BTreeMap<String, String>,
    pub vote_tally: BTreeMap<String, u32>,
    pub my_vote: Option<String>,
    /// Players still in contention, other than me
    pub eligible_vote_targets: Vec<Player>,
    /// Active players who have not voted yet
    pub votes_outstanding: usize,
    pub all_active_voted: bool,
}

/// Derive the view of `my_player_id` from a snapshot. Pure.
pub fn project(snapshot: &RoomSnapshot, my_player_id: &str) -> ClientView {
    let room = &snapshot.state.room;
    let players = snapshot.state.players.clone();

    let my_player = players.iter().find(|p| p.id == my_player_id).cloned();
    let current_player = room
        .current_player_id()
        .and_then(|id| players.iter().find(|p| p.id == id))
        .cloned();

    let is_my_turn = current_player.as_ref().map(|p| p.id.as_str()) == Some(my_player_id);
    let am_i_impostor = my_player.as_ref().is_some_and(|p| p.is_impostor);
    let am_i_host = room.host_player_id == my_player_id;
    let am_i_eliminated = my_player.as_ref().is_some_and(|p| p.is_eliminated);

    let visible_topic = if am_i_impostor && room.phase != GamePhase::Results {
        None
    } else {
        room.topic.clone()
    };

    let votes_by_voter: BTreeMap<String, String> = snapshot
        .votes
        .iter()
        .map(|v| (v.voter_id.clone(), v.voted_for_id.clone()))
        .collect();
    let vote_tally = tally_votes(&snapshot.votes);
    let my_vote = votes_by_voter.get(my_player_id).cloned();

    let eligible_vote_targets: Vec<Player> = players
        .iter()
        .filter(|p| p.is_active() && p.id != my_player_id)
        .cloned()
        .collect();

    let active: Vec<&Player> = players.iter().filter(|p| p.is_active()).collect();
    let votes_outstanding = active
        .iter()
        .filter(|p| !votes_by_voter.contains_key(&p.id))
        .count();
    let all_active_voted = !active.is_empty() && votes_outstanding == 0;

    ClientView {
        room_id: room.id.clone(),
        join_code: room.join_code.clone(),
        phase: room.phase,
        round_number: room.round_number,
        my_player,
        current_player,
        is_my_turn,
        am_i_impostor,
        am_i_host,
        am_i_eliminated,
        visible_topic,
        players,
        responses: snapshot.responses.clone(),
        votes_by_voter,
        vote_tally,
        my_vote,
        eligible_vote_targets,
        votes_outstanding,
        all_active_voted,
    }
}
