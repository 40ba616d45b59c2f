pub mod config;
pub mod quote;
pub mod task;

pub use config::*;
pub use task::*;
