//! UI components for the quest board.

mod app;
mod demo_controls;
mod quest_form;
mod quest_list;
mod wallet_panel;

pub use app::*;
pub use demo_controls::*;
pub use quest_form::*;
pub use quest_list::*;
pub use wallet_panel::*;
