use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Host configuration, stored as TOML.
///
/// Missing keys fall back to their defaults, so an old file keeps working
/// when new options appear.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
	/// Words per prefix window (>= 1).
	pub prefix_length: usize,

	/// Upper bound on generated words per sentence (>= 1).
	pub sentence_length: usize,

	/// Reply to roughly one message in `response_frequency`; 0 disables.
	pub response_frequency: u32,

	/// Any of these appearing in a message forces a reply.
	pub trigger_words: Vec<String>,

	/// Name that, at the start of a message, turns it into a command.
	pub bot_name: String,

	/// Root of the text corpus.
	pub archive_dir: PathBuf,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			prefix_length: 2,
			sentence_length: 100,
			response_frequency: 15,
			trigger_words: Vec::new(),
			bot_name: "babble".to_owned(),
			archive_dir: PathBuf::from("archive"),
		}
	}
}

impl Config {
	/// Parses and validates a TOML document.
	pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	pub fn to_toml(&self) -> Result<String, ConfigError> {
		Ok(toml::to_string_pretty(self)?)
	}

	/// Loads the configuration at `path`.
	///
	/// # Errors
	/// If the file does not exist, a default one is written and
	/// `ConfigError::Created` is returned so the host can tell the user to
	/// review it before starting again.
	pub fn load_or_init<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		match fs::read_to_string(path) {
			Ok(text) => Self::from_toml(&text),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				let text = Self::default().to_toml()?;
				fs::write(path, text)
					.map_err(|source| ConfigError::Write { path: path.to_path_buf(), source })?;
				Err(ConfigError::Created(path.to_path_buf()))
			}
			Err(source) => Err(ConfigError::Read { path: path.to_path_buf(), source }),
		}
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.prefix_length < 1 {
			return Err(ConfigError::Invalid("prefix_length cannot be less than 1".to_owned()));
		}
		if self.sentence_length < 1 {
			return Err(ConfigError::Invalid("sentence_length cannot be less than 1".to_owned()));
		}
		Ok(())
	}
}
