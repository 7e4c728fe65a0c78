mod eliminate_player;
mod get_player;
mod list_players;
mod update_score;

pub use eliminate_player::*;
pub use get_player::*;
pub use list_players::*;
pub use update_score::*;
