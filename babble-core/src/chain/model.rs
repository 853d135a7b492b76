use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use rand::Rng;

use serde::{Deserialize, Serialize};

use super::prefix::{BOUNDARY, Prefix};
use super::stats::ChainStats;
use super::suffixes::Suffixes;
use crate::error::{ChainError, Result};
use crate::format;

/// Word-level Markov chain of order `prefix_len`.
///
/// Every prefix key maps to the words observed right after it. A key seen
/// once holds a `Suffixes::Single`; it becomes a weighted `Suffixes::Many`
/// on its second observation.
///
/// # Responsibilities
/// - Learn transitions from lines of text
/// - Pick the next word for a prefix (weighted random)
/// - Generate raw word sequences and formatted sentences
/// - Merge with another model of the same order
///
/// # Invariants
/// - `prefix_len` is always >= 1
/// - Each key appears once, holding exactly one `Suffixes` variant
/// - Each entry's total equals the number of transitions learned from its key
///
/// The model does no locking. Hosts sharing one model between threads must
/// serialize `learn` against everything else.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChainModel {
	prefix_len: usize,
	chain: HashMap<String, Suffixes>,
}

impl ChainModel {
	/// Creates an empty model with windows of `prefix_len` words.
	///
	/// # Errors
	/// Returns `InvalidPrefixLength` if `prefix_len` is 0.
	pub fn new(prefix_len: usize) -> Result<Self> {
		if prefix_len < 1 {
			return Err(ChainError::InvalidPrefixLength);
		}
		Ok(Self { prefix_len, chain: HashMap::new() })
	}

	/// Empty model with the same configuration.
	pub(crate) fn empty_like(&self) -> Self {
		Self { prefix_len: self.prefix_len, chain: HashMap::new() }
	}

	pub fn prefix_len(&self) -> usize {
		self.prefix_len
	}

	pub fn is_empty(&self) -> bool {
		self.chain.is_empty()
	}

	/// Number of distinct prefixes learned.
	pub fn prefix_count(&self) -> usize {
		self.chain.len()
	}

	/// Number of prefixes still holding a single suffix.
	pub fn singleton_count(&self) -> usize {
		self.chain.values().filter(|s| s.is_single()).count()
	}

	/// Suffixes recorded for a prefix key, if any.
	pub fn suffixes(&self, key: &str) -> Option<&Suffixes> {
		self.chain.get(key)
	}

	/// Iterates over `(prefix key, suffixes)` in arbitrary order.
	pub fn entries(&self) -> impl Iterator<Item = (&str, &Suffixes)> {
		self.chain.iter().map(|(key, suffixes)| (key.as_str(), suffixes))
	}

	/// Learns every line of `text`.
	///
	/// Each line is split on whitespace and walked with a window that starts
	/// full of boundary markers; a boundary is recorded after the last word.
	/// Blank lines are ignored. Never fails: odd input only yields odd words.
	pub fn learn(&mut self, text: &str) {
		for line in text.lines() {
			self.learn_line(line);
		}
	}

	fn learn_line(&mut self, line: &str) {
		let mut words = line.split_whitespace().peekable();
		if words.peek().is_none() {
			return;
		}

		let mut prefix = Prefix::start(self.prefix_len);
		for word in words {
			self.observe(prefix.key(), word);
			prefix.shift(word);
		}
		self.observe(prefix.key(), BOUNDARY);
	}

	fn observe(&mut self, key: String, word: &str) {
		match self.chain.entry(key) {
			Entry::Occupied(mut entry) => entry.get_mut().observe(word),
			Entry::Vacant(entry) => {
				entry.insert(Suffixes::Single(word.to_owned()));
			}
		}
	}

	/// Picks the word following `key` using the thread-local generator.
	pub fn next_word(&self, key: &str) -> Result<&str> {
		self.next_word_with(key, &mut rand::rng())
	}

	/// Picks the word following `key`.
	///
	/// # Errors
	/// Returns `UnknownPrefix` if `key` was never learned. Callers should
	/// read it as "no continuation", not as a failure.
	pub fn next_word_with<R: Rng + ?Sized>(&self, key: &str, rng: &mut R) -> Result<&str> {
		self.chain
			.get(key)
			.and_then(|suffixes| suffixes.next_word(rng))
			.ok_or_else(|| ChainError::UnknownPrefix(key.to_owned()))
	}

	/// Generates up to `max_words` raw words from the start of a sentence.
	pub fn generate(&self, max_words: usize) -> Result<Vec<String>> {
		self.generate_with(max_words, Prefix::start(self.prefix_len), &mut rand::rng())
	}

	/// Generates up to `max_words` raw words continuing `seed`.
	///
	/// The seed is normalized, left-padded with boundary markers or cut down
	/// to its last `prefix_len` words. Seed words are not part of the output.
	pub fn generate_from<S: AsRef<str>>(&self, max_words: usize, seed: &[S]) -> Result<Vec<String>> {
		self.generate_with(max_words, Prefix::from_seed(self.prefix_len, seed), &mut rand::rng())
	}

	/// Walks the chain from `prefix`.
	///
	/// Stops on the boundary marker (not emitted) or after `max_words` words,
	/// whichever comes first. No punctuation is added.
	///
	/// # Errors
	/// - `EmptyModel` if nothing was ever learned
	/// - `UnknownPrefix` if the starting window was never learned
	pub fn generate_with<R: Rng + ?Sized>(
		&self,
		max_words: usize,
		mut prefix: Prefix,
		rng: &mut R,
	) -> Result<Vec<String>> {
		if self.is_empty() {
			return Err(ChainError::EmptyModel);
		}

		let mut words = Vec::new();
		while words.len() < max_words {
			let next = match self.next_word_with(&prefix.key(), rng) {
				Ok(next) => next,
				Err(e) if words.is_empty() => return Err(e),
				Err(e) => {
					// Every window reached mid-sentence was learned; keep what we have.
					log::warn!("generation stopped early: {}", e);
					break;
				}
			};
			if next == BOUNDARY {
				break;
			}
			words.push(next.to_owned());
			prefix.shift(next);
		}

		Ok(words)
	}

	/// Generates and formats a sentence from the start of a sentence.
	pub fn sentence(&self, max_words: usize) -> Result<String> {
		self.sentence_with(max_words, &mut rand::rng())
	}

	/// Generates and formats a sentence using `rng` for every random choice.
	pub fn sentence_with<R: Rng + ?Sized>(&self, max_words: usize, rng: &mut R) -> Result<String> {
		let words = self.generate_with(max_words, Prefix::start(self.prefix_len), rng)?;
		Ok(format::format_with(&words, rng))
	}

	/// Merges another model into this one.
	///
	/// Counts for shared prefixes are summed; a single suffix merged into an
	/// existing entry counts as one more observation. Learning two halves of a
	/// corpus separately and merging equals learning it in one go.
	///
	/// # Errors
	/// Returns `PrefixMismatch` if the prefix lengths differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.prefix_len != other.prefix_len {
			return Err(ChainError::PrefixMismatch {
				expected: self.prefix_len,
				found: other.prefix_len,
			});
		}

		for (key, theirs) in &other.chain {
			match self.chain.get_mut(key) {
				Some(existing) => existing.absorb(theirs),
				None => {
					self.chain.insert(key.clone(), theirs.clone());
				}
			}
		}

		Ok(())
	}

	/// Computes summary statistics.
	pub fn stats(&self) -> ChainStats {
		ChainStats::compute(self, &Prefix::start(self.prefix_len).key())
	}

	/// Serializes the model with `postcard`.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_stdvec(self)?)
	}

	/// Restores a model serialized by `to_bytes`.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		let model: Self = postcard::from_bytes(bytes)?;
		if model.prefix_len < 1 {
			return Err(ChainError::InvalidPrefixLength);
		}
		Ok(model)
	}

	/// Writes a snapshot to `path`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		std::fs::write(path, self.to_bytes()?)?;
		Ok(())
	}

	/// Loads a snapshot from `path`.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = std::fs::read(path)?;
		Self::from_bytes(&bytes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn learned(prefix_len: usize, text: &str) -> ChainModel {
		let mut model = ChainModel::new(prefix_len).unwrap();
		model.learn(text);
		model
	}

	fn assert_totals_consistent(model: &ChainModel) {
		for (key, suffixes) in model.entries() {
			if let Suffixes::Many(set) = suffixes {
				let sum: usize = set.iter().map(|(_, count)| count).sum();
				assert_eq!(sum, set.total(), "prefix {:?}", key);
			}
		}
	}

	#[test]
	fn zero_prefix_length_is_rejected() {
		assert!(matches!(ChainModel::new(0), Err(ChainError::InvalidPrefixLength)));
	}

	#[test]
	fn single_line_follows_singleton_path() {
		let model = learned(2, "a b c\n");
		let start = Prefix::start(2).key();
		for _ in 0..50 {
			assert_eq!(model.next_word(&start).unwrap(), "a");
		}
		assert_eq!(model.prefix_count(), 4);
		assert_eq!(model.singleton_count(), 4);
		assert_eq!(model.generate(100).unwrap(), vec!["a", "b", "c"]);
	}

	#[test]
	fn repeated_prefix_is_promoted() {
		let model = learned(2, "a b\na c\n");
		let start = model.suffixes(&Prefix::start(2).key()).unwrap();
		assert!(!start.is_single());
		assert_eq!(start.count("a"), 2);

		let after_a = model.suffixes(&Prefix::from_seed(2, &["a"]).key()).unwrap();
		assert_eq!(after_a.count("b"), 1);
		assert_eq!(after_a.count("c"), 1);
		assert_eq!(after_a.total(), 2);
		assert_totals_consistent(&model);
	}

	#[test]
	fn suffixes_keep_raw_words_while_prefixes_are_normalized() {
		let model = learned(2, "\"Hello, (World) again\n");
		let start = model.suffixes(&Prefix::start(2).key()).unwrap();
		assert_eq!(start.count("\"Hello,"), 1);
		assert!(model.suffixes("hello world").is_some());
		assert_eq!(model.suffixes("hello world").unwrap().count("again"), 1);
	}

	#[test]
	fn blank_lines_are_ignored() {
		let model = learned(2, "\n   \n\t\n");
		assert!(model.is_empty());
	}

	#[test]
	fn last_line_without_newline_is_learned() {
		let model = learned(1, "x y");
		assert_eq!(model.next_word("x").unwrap(), "y");
		assert_eq!(model.next_word("y").unwrap(), BOUNDARY);
	}

	#[test]
	fn learning_twice_doubles_counts_and_keeps_distribution() {
		let corpus = "the cat sat on the mat\nthe dog sat on the cat\nthe end\n";
		let once = learned(2, corpus);
		let mut twice = once.clone();
		twice.learn(corpus);

		assert_eq!(once.prefix_count(), twice.prefix_count());
		for (key, suffixes) in once.entries() {
			let doubled = twice.suffixes(key).expect("same prefixes");
			assert_eq!(doubled.total(), suffixes.total() * 2);
			match suffixes {
				Suffixes::Single(word) => assert_eq!(doubled.count(word), 2),
				Suffixes::Many(set) => {
					for (word, count) in set.iter() {
						assert_eq!(doubled.count(word), count * 2);
						let p1 = count as f64 / suffixes.total() as f64;
						let p2 = doubled.count(word) as f64 / doubled.total() as f64;
						assert!((p1 - p2).abs() < 1e-12);
					}
				}
			}
		}
		assert_totals_consistent(&twice);
	}

	#[test]
	fn empty_model_cannot_generate() {
		let model = ChainModel::new(2).unwrap();
		assert!(matches!(model.generate(10), Err(ChainError::EmptyModel)));
		assert!(matches!(model.sentence(10), Err(ChainError::EmptyModel)));
	}

	#[test]
	fn zero_words_yields_nothing() {
		let model = learned(2, "a b c\n");
		assert!(model.generate(0).unwrap().is_empty());
		assert_eq!(model.sentence(0).unwrap(), "");
		assert!(model.generate_from(0, &["a"]).unwrap().is_empty());
		assert!(model.generate_from(0, &["never", "seen"]).unwrap().is_empty());
	}

	#[test]
	fn generation_is_truncated_at_max_words() {
		let model = learned(1, "one two three four five\n");
		assert_eq!(model.generate(2).unwrap(), vec!["one", "two"]);
	}

	#[test]
	fn unknown_prefix_is_reported() {
		let model = learned(2, "a b c\n");
		assert!(matches!(model.next_word("nope nope"), Err(ChainError::UnknownPrefix(_))));
		assert!(matches!(model.generate_from(10, &["zebra", "x"]), Err(ChainError::UnknownPrefix(_))));
	}

	#[test]
	fn seeded_generation_continues_the_seed() {
		let model = learned(2, "love is incredible\n");
		assert_eq!(model.generate_from(10, &["Love", "is"]).unwrap(), vec!["incredible"]);
		assert_eq!(model.generate_from(10, &["what", "love", "is"]).unwrap(), vec!["incredible"]);
	}

	#[test]
	fn sentence_is_formatted() {
		let model = learned(2, "the cat sat\n");
		let mut rng = StdRng::seed_from_u64(1);
		let sentence = model.sentence_with(100, &mut rng).unwrap();
		assert!(
			["The cat sat.", "The cat sat!", "The cat sat?"].contains(&sentence.as_str()),
			"got {}",
			sentence
		);
	}

	#[test]
	fn merged_halves_equal_sequential_learning() {
		let lines = ["a b c", "a b d", "x a b", "a b c", "c"];
		let whole = learned(2, &lines.join("\n"));

		let mut left = learned(2, &lines[..2].join("\n"));
		let right = learned(2, &lines[2..].join("\n"));
		left.merge(&right).unwrap();

		assert_eq!(left, whole);
		assert_totals_consistent(&left);
	}

	#[test]
	fn merge_rejects_different_orders() {
		let mut two = ChainModel::new(2).unwrap();
		let three = ChainModel::new(3).unwrap();
		assert!(matches!(
			two.merge(&three),
			Err(ChainError::PrefixMismatch { expected: 2, found: 3 })
		));
	}

	#[test]
	fn snapshot_restores_the_same_model() {
		let model = learned(2, "the cat sat\nthe cat ran\n");
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("brain.bin");
		model.save(&path).unwrap();
		assert_eq!(ChainModel::load(&path).unwrap(), model);
	}
}
