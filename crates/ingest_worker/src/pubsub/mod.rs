mod consumer;

pub use consumer::*;
