mod player;
mod response;
mod room;
mod vote;

pub use player::*;
pub use response::*;
pub use room::*;
pub use vote::*;
