//! # Quaderno Architecture
//!
//! Quaderno is a farm logbook ("quaderno di campagna"): pesticide treatments,
//! fertilizations and warehouse stock for a single farm, kept as plain JSON
//! files that stay readable and hand-editable.
//!
//! Like any library with a CLI on top, the core knows nothing about terminals.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, applies config defaults       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Load, run one operation, persist, report messages        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Ledger (ledger.rs)                                         │
//! │  - Stock balances and the movement log, kept in step        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DataStore trait, FileStore (production),                 │
//! │    InMemoryStore (testing)                                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never calls
//! `std::process::exit`. Diagnostics go through `tracing`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: One module per user-facing operation
//! - [`ledger`]: The inventory ledger (consume, return, upsert, relabel)
//! - [`store`]: Storage abstraction, recovery of damaged files
//! - [`model`]: Records as they appear in the JSON files
//! - [`coerce`]: Lenient number/text decoding for hand-edited files
//! - [`config`]: Per-scope configuration
//! - [`init`]: Locating data directories and wiring the API
//! - [`logging`]: `tracing-subscriber` setup for the binary
//! - [`error`]: Error types

pub mod api;
pub mod coerce;
pub mod commands;
pub mod config;
pub mod error;
pub mod init;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod store;
