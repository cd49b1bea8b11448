//! Command implementations

mod dump;
mod erase;
mod probe;
mod save;
mod status;

pub use dump::run_dump;
pub use erase::run_erase;
pub use probe::run_probe;
pub use save::run_save;
pub use status::run_status;
