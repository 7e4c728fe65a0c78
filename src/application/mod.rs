mod error;
pub mod player;
pub mod room;
pub mod turn;
pub mod voting;

pub use error::*;
