mod game_rules;
mod snapshot;

pub use game_rules::*;
pub use snapshot::*;
