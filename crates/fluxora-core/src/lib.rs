//! # Fluxora Core
//!
//! Wallet session, quest store, and view projections for the Fluxora quest
//! front-end.
//!
//! The crate holds no rendering knowledge. Components publish immutable
//! state and a presenter projects that state onto display regions, so the
//! same logic drives the desktop app and headless tests alike.
//!
//! ## Key Types
//!
//! - [`WalletSession`]: Owns the single connection to an external wallet provider
//! - [`WalletProvider`]: The injected wallet capability the session talks to
//! - [`ConnectionPresenter`]: Projects session snapshots onto display regions
//! - [`QuestStore`]: In-memory quest list with a best-effort persistence slot
//! - [`QuestFormController`]: Validates quest input before it reaches the store

pub mod address;
pub mod config;
pub mod error;
pub mod form;
pub mod mock_provider;
pub mod network;
pub mod presenter;
pub mod provider;
pub mod quest;
pub mod regions;
pub mod sanitize;
pub mod session;
pub mod storage;

// Re-export main types
pub use address::*;
pub use config::*;
pub use error::*;
pub use form::*;
pub use mock_provider::*;
pub use network::*;
pub use presenter::*;
pub use provider::*;
pub use quest::*;
pub use regions::*;
pub use sanitize::*;
pub use session::*;
pub use storage::*;
