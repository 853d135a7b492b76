//! Commands addressed to the bot.
//!
//! A command is a message split into words, the first one naming the
//! command. Each command answers with a generated sentence, or nothing.

use rand::Rng;

use crate::chain::{ChainModel, Prefix};
use crate::format;

/// Characters stripped from question words before seeding.
const QUESTION_NOISE: &[char] = &['?', '!', '.', '"', '(', ')'];

/// Interprets `words` as a command using the thread-local generator.
pub fn interpret<S: AsRef<str>>(model: &ChainModel, words: &[S], max_words: usize) -> Option<String> {
	interpret_with(model, words, max_words, &mut rand::rng())
}

/// Interprets `words` as a command.
///
/// Returns `None` for unknown commands, malformed arguments, or when the
/// model has nothing to say.
pub fn interpret_with<S: AsRef<str>, R: Rng + ?Sized>(
	model: &ChainModel,
	words: &[S],
	max_words: usize,
	rng: &mut R,
) -> Option<String> {
	let (command, args) = words.split_first()?;
	match command.as_ref().to_lowercase().as_str() {
		"what" | "who" => what(model, args, max_words, rng),
		_ => None,
	}
}

/// Answers "what is X" / "what are X" by continuing "X is" / "X are".
///
/// Example: `what is love?` can answer `Love is incredible!`.
fn what<S: AsRef<str>, R: Rng + ?Sized>(
	model: &ChainModel,
	args: &[S],
	max_words: usize,
	rng: &mut R,
) -> Option<String> {
	let (verb, subject) = args.split_first()?;
	let verb = verb.as_ref();
	if subject.is_empty() || !matches!(verb.to_lowercase().as_str(), "is" | "are") {
		return None;
	}

	let mut seed: Vec<String> = subject
		.iter()
		.map(|w| w.as_ref().trim_matches(QUESTION_NOISE).to_owned())
		.filter(|w| !w.is_empty())
		.collect();
	seed.push(verb.to_owned());

	let prefix = Prefix::from_seed(model.prefix_len(), &seed);
	if model.suffixes(&prefix.key()).is_none() {
		log::debug!("no answer for {:?}: subject never learned", seed);
		return None;
	}
	let remaining = max_words.saturating_sub(seed.len());
	match model.generate_with(remaining, prefix, rng) {
		Ok(words) => {
			seed.extend(words);
			Some(format::format_with(&seed, rng))
		}
		Err(e) => {
			log::debug!("no answer for {:?}: {}", seed, e);
			None
		}
	}
}
