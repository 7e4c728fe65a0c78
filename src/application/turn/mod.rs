mod get_responses;
mod next_turn;
mod submit_response;

pub use get_responses::*;
pub use next_turn::*;
pub use submit_response::*;
