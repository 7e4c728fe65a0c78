//! Game service - Core rules of the impostor game
//!
//! Pure functions over entities: impostor draw, turn rotation, vote tally
//! and round scoring. Nothing here touches the store.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::domain::entities::{Player, Vote};
use crate::domain::value_objects::GameRules;

/// Draw the impostor uniformly from the candidates
pub fn pick_impostor(candidates: &[String], seed: Option<u64>) -> Option<String> {
    let mut rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    candidates.choose(&mut rng).cloned()
}

/// Turn pointer after one advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnAdvance {
    pub turn_index: u32,
    pub round_number: u32,
    /// The advance wrapped back to the first member
    pub lap_completed: bool,
}

/// Advance the turn through the fixed member order.
///
/// Eliminated players are not skipped. Returns `None` for an empty room.
pub fn advance_turn(
    current_turn_index: Option<u32>,
    round_number: Option<u32>,
    member_count: usize,
) -> Option<TurnAdvance> {
    if member_count == 0 {
        return None;
    }
    let current = current_turn_index.unwrap_or(0) as usize;
    let next = (current + 1) % member_count;
    let round = round_number.unwrap_or(1);
    let lap_completed = next == 0;

    Some(TurnAdvance {
        turn_index: next as u32,
        round_number: if lap_completed { round + 1 } else { round },
        lap_completed,
    })
}

/// Count votes per target, keyed (and iterated) by ascending player id
pub fn tally_votes(votes: &[Vote]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for vote in votes {
        *counts.entry(vote.voted_for_id.clone()).or_insert(0) += 1;
    }
    counts
}

/// Target with the strictly highest count.
///
/// Ties go to the first target seen in ascending id order.
pub fn most_voted(counts: &BTreeMap<String, u32>) -> Option<(&str, u32)> {
    let mut best: Option<(&str, u32)> = None;
    for (player_id, &count) in counts {
        match best {
            Some((_, max)) if count <= max => {}
            _ => best = Some((player_id.as_str(), count)),
        }
    }
    best
}

/// The impostor of the running round: flagged and not yet eliminated.
///
/// Impostors caught in earlier rounds keep their flag, so the flag alone
/// is not enough.
pub fn active_impostor(players: &[Player]) -> Option<&Player> {
    players.iter().find(|p| p.is_impostor && !p.is_eliminated)
}

/// Score change for one player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreAward {
    pub player_id: String,
    pub points: i64,
}

/// Flat round bonus: every player never flagged impostor when caught, the
/// active impostor alone otherwise
pub fn score_round(
    players: &[Player],
    impostor_id: Option<&str>,
    impostor_caught: bool,
    rules: &GameRules,
) -> Vec<ScoreAward> {
    if impostor_caught {
        players
            .iter()
            .filter(|p| !p.is_impostor && Some(p.id.as_str()) != impostor_id)
            .map(|p| ScoreAward {
                player_id: p.id.clone(),
                points: rules.caught_bonus,
            })
            .collect()
    } else {
        impostor_id
            .map(|id| {
                vec![ScoreAward {
                    player_id: id.to_string(),
                    points: rules.evaded_bonus,
                }]
            })
            .unwrap_or_default()
    }
}
