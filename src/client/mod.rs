//! Client side of the synchronization contract: a session context object
//! per connected player, the pure projection it renders from, and an HTTP
//! command client.

mod api_client;
mod projection;
mod session;

pub use api_client::*;
pub use projection::*;
pub use session::*;
