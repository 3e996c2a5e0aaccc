mod event_processor;
mod payload;

pub use event_processor::*;
pub use payload::*;
