mod create_room;
mod get_game_state;
mod get_room_by_code;
mod get_room_snapshot;
mod join_room;
mod leave_room;
mod start_game;
mod start_voting_phase;

pub use create_room::*;
pub use get_game_state::*;
pub use get_room_by_code::*;
pub use get_room_snapshot::*;
pub use join_room::*;
pub use leave_room::*;
pub use start_game::*;
pub use start_voting_phase::*;
