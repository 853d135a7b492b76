use std::collections::HashMap;
use std::fmt;

use rand::Rng;

use serde::{Deserialize, Serialize};

use super::prefix::BOUNDARY;

/// Weighted set of words observed after one prefix.
///
/// Conceptually, the outgoing edges of a node in the chain, weighted by how
/// many times each was observed.
///
/// ## Invariants
/// - `total` equals the sum of all counts
/// - Each count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SuffixSet {
	/// Example: { "cat" => 42, "dog" => 3 }
	counts: HashMap<String, usize>,
	total: usize,
}

impl SuffixSet {
	/// Records one more occurrence of `word`.
	pub fn add(&mut self, word: &str) {
		self.add_count(word, 1);
	}

	fn add_count(&mut self, word: &str, count: usize) {
		if count == 0 {
			return;
		}
		*self.counts.entry(word.to_owned()).or_insert(0) += count;
		self.total += count;
	}

	pub fn total(&self) -> usize {
		self.total
	}

	/// Number of distinct words.
	pub fn len(&self) -> usize {
		self.counts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	pub fn count(&self, word: &str) -> usize {
		self.counts.get(word).copied().unwrap_or(0)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
		self.counts.iter().map(|(word, count)| (word.as_str(), *count))
	}

	/// Picks a word with probability `count / total`.
	///
	/// Draws `r` in `[0, total)` and walks the entries, subtracting counts,
	/// until `r` falls inside an entry. The result does not depend on the
	/// map's iteration order.
	///
	/// Returns `None` only if the set is empty.
	pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		if self.total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..self.total);
		for (word, count) in &self.counts {
			if r < *count {
				return Some(word);
			}
			r -= count;
		}

		None
	}

	/// Adds every count of `other` into this set.
	pub fn merge(&mut self, other: &Self) {
		for (word, count) in &other.counts {
			self.add_count(word, *count);
		}
	}
}

/// What follows a prefix.
///
/// Most prefixes are only ever seen once, so they keep a single word instead
/// of a full `SuffixSet`. The second observation (same word or not) promotes
/// the entry to `Many`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Suffixes {
	Single(String),
	Many(SuffixSet),
}

impl Suffixes {
	/// Records an observation of `word` after this prefix.
	pub fn observe(&mut self, word: &str) {
		match self {
			Suffixes::Many(set) => set.add(word),
			Suffixes::Single(first) => {
				let mut set = SuffixSet::default();
				set.add(first);
				set.add(word);
				*self = Suffixes::Many(set);
			}
		}
	}

	/// Next word: the only one for `Single`, a weighted draw for `Many`.
	pub fn next_word<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		match self {
			Suffixes::Single(word) => Some(word),
			Suffixes::Many(set) => set.pick(rng),
		}
	}

	/// Number of observations recorded.
	pub fn total(&self) -> usize {
		match self {
			Suffixes::Single(_) => 1,
			Suffixes::Many(set) => set.total(),
		}
	}

	/// Number of distinct words recorded.
	pub fn unique(&self) -> usize {
		match self {
			Suffixes::Single(_) => 1,
			Suffixes::Many(set) => set.len(),
		}
	}

	pub fn count(&self, word: &str) -> usize {
		match self {
			Suffixes::Single(only) if only == word => 1,
			Suffixes::Single(_) => 0,
			Suffixes::Many(set) => set.count(word),
		}
	}

	pub fn is_single(&self) -> bool {
		matches!(self, Suffixes::Single(_))
	}

	/// Folds another entry for the same prefix into this one.
	///
	/// A `Single` absorbed into anything counts as one more observation, so
	/// merging partial models gives the same result as learning sequentially.
	pub fn absorb(&mut self, other: &Suffixes) {
		match other {
			Suffixes::Single(word) => self.observe(word),
			Suffixes::Many(theirs) => {
				let mut set = match std::mem::replace(self, Suffixes::Many(SuffixSet::default())) {
					Suffixes::Single(word) => {
						let mut set = SuffixSet::default();
						set.add(&word);
						set
					}
					Suffixes::Many(set) => set,
				};
				set.merge(theirs);
				*self = Suffixes::Many(set);
			}
		}
	}
}

fn display_word(word: &str) -> &str {
	if word == BOUNDARY { "<END>" } else { word }
}

/// Renders `word (xN) other <END>`, most frequent first.
impl fmt::Display for Suffixes {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Suffixes::Single(word) => write!(f, "{}", display_word(word)),
			Suffixes::Many(set) => {
				let mut entries: Vec<(&str, usize)> = set.iter().collect();
				entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
				for (i, (word, count)) in entries.into_iter().enumerate() {
					if i > 0 {
						write!(f, " ")?;
					}
					write!(f, "{}", display_word(word))?;
					if count > 1 {
						write!(f, " (x{})", count)?;
					}
				}
				Ok(())
			}
		}
	}
}
