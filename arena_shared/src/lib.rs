//! `arena_shared`
//!
//! Libraries shared by the arena client and anything that speaks its protocol.
//!
//! Design goals:
//! - The wire format is the contract; keep it explicit and serde-driven.
//! - No I/O beyond JSON encoding.
//! - No `unsafe`.

pub mod config;
pub mod math;
pub mod net;
