//! API Modules
//!
//! Each resource keeps its router in `mod.rs` and its handlers in
//! `handler.rs`.

pub mod auth;
pub mod billing;
pub mod favorites;
pub mod health;
pub mod listings;
pub mod profile;
pub mod search;
pub mod upload;
pub mod view;
