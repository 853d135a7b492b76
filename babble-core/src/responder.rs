use rand::Rng;

use crate::chain::ChainModel;
use crate::command;
use crate::config::Config;

/// Reply policy for incoming chat messages.
///
/// In order of priority:
/// 1. A message starting with the bot's name is read as a command
/// 2. A message containing a trigger word always gets a sentence
/// 3. Otherwise a sentence is sent with probability `1 / frequency`
#[derive(Clone, Debug)]
pub struct Responder {
	name: String,
	triggers: Vec<String>,
	frequency: u32,
	max_words: usize,
}

impl Responder {
	pub fn new(config: &Config) -> Self {
		Self {
			name: config.bot_name.to_lowercase(),
			triggers: config
				.trigger_words
				.iter()
				.map(|w| w.to_lowercase())
				.filter(|w| !w.is_empty())
				.collect(),
			frequency: config.response_frequency,
			max_words: config.sentence_length,
		}
	}

	/// `respond_with` using the thread-local generator.
	pub fn respond(&self, model: &ChainModel, message: &str) -> Option<String> {
		self.respond_with(model, message, &mut rand::rng())
	}

	/// Decides on, and generates, a reply to `message`.
	///
	/// Returns `None` when no reply is due or the model has nothing to say.
	pub fn respond_with<R: Rng + ?Sized>(&self, model: &ChainModel, message: &str, rng: &mut R) -> Option<String> {
		let lowered = message.to_lowercase();

		if self.is_addressed(message) {
			let words: Vec<&str> = message.split_whitespace().skip(1).collect();
			if let Some(reply) = command::interpret_with(model, &words, self.max_words, rng) {
				return Some(reply);
			}
		}

		if self.triggers.iter().any(|t| lowered.contains(t.as_str())) {
			return self.speak(model, rng);
		}

		if self.frequency > 0 && rng.random_range(0..self.frequency) == 0 {
			return self.speak(model, rng);
		}

		None
	}

	/// True when the first word of `message` is the bot's name, optionally
	/// followed by `,` or `:`.
	fn is_addressed(&self, message: &str) -> bool {
		match message.split_whitespace().next() {
			Some(first) => !self.name.is_empty() && first.trim_end_matches([',', ':']).to_lowercase() == self.name,
			None => false,
		}
	}

	fn speak<R: Rng + ?Sized>(&self, model: &ChainModel, rng: &mut R) -> Option<String> {
		match model.sentence_with(self.max_words, rng) {
			Ok(sentence) if !sentence.is_empty() => Some(sentence),
			Ok(_) => None,
			Err(e) => {
				log::debug!("staying quiet: {}", e);
				None
			}
		}
	}
}
