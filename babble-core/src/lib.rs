//! Word-level Markov chain babbling library.
//!
//! This crate provides everything a host needs to make a chatty bot:
//! - An order-N word chain model with singleton promotion
//! - Prose formatting for raw generated tokens
//! - A plain-text corpus archive (loading and per-user recording)
//! - Configuration, command interpretation and a response policy
//!
//! Hosts own the model and pass it by reference; nothing here is global.

/// Order-N word chain: learning, sampling, generation, statistics.
pub mod chain;

/// Error types shared across the crate.
pub mod error;

/// Turns raw generated tokens into a presentable sentence.
pub mod format;

/// Plain-text corpus archive on disk.
pub mod corpus;

/// TOML configuration file.
pub mod config;

/// Commands addressed to the bot ("what is ...").
pub mod command;

/// Decides whether an incoming message deserves a reply.
pub mod responder;

/// File helpers (reading corpora, walking directories).
///
/// Not exposed
pub(crate) mod io;

pub use chain::{ChainModel, ChainStats, BOUNDARY};
pub use config::Config;
pub use error::{ChainError, ConfigError};
