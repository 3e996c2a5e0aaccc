pub mod domain;
pub mod ingest_worker;
pub mod pubsub;

pub use domain::*;
pub use ingest_worker::*;
pub use pubsub::*;
