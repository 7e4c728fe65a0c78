mod calculate_results;
mod get_votes;
mod reset_game_for_new_round;
mod submit_vote;

pub use calculate_results::*;
pub use get_votes::*;
pub use reset_game_for_new_round::*;
pub use submit_vote::*;
