mod event;
mod log_entry;
mod result;
mod traits;

pub use event::*;
pub use log_entry::*;
pub use result::*;
pub use traits::*;
