//! Core types and trait definitions for BingoMap.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! server, the SQLite backend and the CLI all depend on it.

pub mod aggregate;
pub mod state;
pub mod store;
pub mod user;
pub mod viewer;

pub use aggregate::{HeatLevel, RANKING_LIMIT, StateAggregate, aggregate, rank};
pub use state::StateCode;
