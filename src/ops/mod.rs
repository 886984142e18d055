pub mod pending;
pub mod render;
pub mod save;
