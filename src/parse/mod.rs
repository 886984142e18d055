pub mod marker;

pub use marker::{format_marker, parse_marker};
