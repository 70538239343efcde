//! Call-signaling relay server library.
//! This crate exposes internal modules for integration testing.
//! The binary entry point is in main.rs.

pub mod config;
pub mod push;
pub mod registry;
pub mod relay;
pub mod routes;
pub mod state;
pub mod wakeup;
pub mod ws;
