pub mod ai_environment;
pub mod api;
pub mod config;
pub mod error;
mod main_lib;

pub use main_lib::{build_state, build_state_with_completion_client, init_tracing, AppState};
