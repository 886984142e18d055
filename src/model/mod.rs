pub mod config;
pub mod entry;
pub mod marker;

pub use config::*;
pub use entry::*;
pub use marker::*;
