//! Desktop front-end for the Fluxora quest board
//!
//! A Dioxus desktop application that drives a [`fluxora_core::WalletSession`]
//! and renders the quest board. Without a browser-injected wallet, the app
//! talks to a scripted demo wallet chosen on the command line.

pub mod components;
pub mod demo_wallet;
pub mod state;
pub mod theme;
