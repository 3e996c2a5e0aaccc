mod auth;
mod logging;
mod pubsub;

pub use auth::*;
pub use logging::*;
pub use pubsub::*;
