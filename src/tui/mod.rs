pub mod app;
pub mod keys;
pub mod render;
pub mod theme;

pub use app::run;
