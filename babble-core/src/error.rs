use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChainError>;

/// Failures of the chain model.
///
/// `EmptyModel` and `UnknownPrefix` are ordinary outcomes that hosts are
/// expected to turn into "nothing to say", never into a crash.
#[derive(Error, Debug)]
pub enum ChainError {
	#[error("could not generate nonsense, brain empty")]
	EmptyModel,

	#[error("prefix length must be >= 1")]
	InvalidPrefixLength,

	#[error("no continuation for prefix {0:?}")]
	UnknownPrefix(String),

	#[error("prefix length mismatch: expected {expected}, found {found}")]
	PrefixMismatch { expected: usize, found: usize },

	#[error("snapshot error: {0}")]
	Snapshot(#[from] postcard::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// Failures while loading or validating the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("no config file detected, a default one has been written to {0}")]
	Created(PathBuf),

	#[error("could not read config file {path}: {source}")]
	Read { path: PathBuf, source: std::io::Error },

	#[error("could not write config file {path}: {source}")]
	Write { path: PathBuf, source: std::io::Error },

	#[error("could not parse config file, delete it to get a fresh default: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("could not serialize config: {0}")]
	Serialize(#[from] toml::ser::Error),

	#[error("invalid config: {0}")]
	Invalid(String),
}
