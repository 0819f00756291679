//! State management for the quest board.

pub mod app_state;

pub use app_state::*;
