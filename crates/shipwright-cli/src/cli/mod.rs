pub mod app;
pub mod download;
pub mod publish;

pub use app::{App, Commands};
