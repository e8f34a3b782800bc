//! Counterbook Library
//!
//! This crate provides the order, stock, and money-ledger core for a
//! retail back office: orders fan out to payments and items, items move
//! stock and snapshot purchase prices, payments book ledger entries,
//! and automations react to the resulting lifecycle events.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod migrator;
pub mod services;

pub mod prelude {
    pub use crate::db::*;
    pub use crate::errors::*;
    pub use crate::events::*;
    pub use crate::services::*;
}
