//! # navmerge
//!
//! Application layer over `navmerge-core`: configuration, file loading, the
//! CLI and the HTTP API.
//!
//! The binary in `main.rs` only sets up logging and dispatches to [`cli`].

pub mod api;
pub mod cli;
pub mod config;
pub mod events;
pub mod files;
