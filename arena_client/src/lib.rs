//! `arena_client`
//!
//! Client-side systems:
//! - Input sampling (held intents + pointer)
//! - Local prediction of movement and firing
//! - Projectile bookkeeping (unfired vs. confirmed)
//! - WebSocket channel to the authority
//! - Reconciliation of authority snapshots
//! - Rendering abstraction wiring

pub mod bullets;
pub mod channel;
pub mod client;
pub mod console;
pub mod input;
pub mod reconcile;
pub mod render;
pub mod sim;
pub mod state;

pub use client::GameClient;
