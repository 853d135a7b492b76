use std::fmt;

use super::model::ChainModel;
use super::prefix::BOUNDARY;

/// Summary numbers describing a model, for reporting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChainStats {
	pub total_prefixes: usize,
	pub singleton_prefixes: usize,
	/// Distinct (prefix, suffix) pairs.
	pub unique_suffixes: usize,
	/// Learned transitions, repeated ones included.
	pub total_suffixes: usize,
	/// Distinct words that can open a sentence.
	pub start_suffixes: usize,
	/// Prefix made only of words with the most transitions, and that count.
	pub most_common: Option<(String, usize)>,
}

impl ChainStats {
	pub(crate) fn compute(model: &ChainModel, start_key: &str) -> Self {
		let mut stats = Self { total_prefixes: model.prefix_count(), ..Self::default() };

		for (key, suffixes) in model.entries() {
			stats.total_suffixes += suffixes.total();
			stats.unique_suffixes += suffixes.unique();
			if suffixes.is_single() {
				stats.singleton_prefixes += 1;
			}
			if key == start_key {
				stats.start_suffixes = suffixes.unique();
			}

			// Windows that still touch the start of a sentence are not interesting.
			if key.starts_with(BOUNDARY) {
				continue;
			}
			let better = match &stats.most_common {
				None => true,
				Some((best, count)) => {
					suffixes.total() > *count || (suffixes.total() == *count && key < best.as_str())
				}
			};
			if better {
				stats.most_common = Some((key.to_owned(), suffixes.total()));
			}
		}

		stats
	}

	/// Average number of distinct suffixes per prefix.
	pub fn complexity(&self) -> f64 {
		if self.total_prefixes == 0 {
			return 0.0;
		}
		self.unique_suffixes as f64 / self.total_prefixes as f64
	}
}

impl fmt::Display for ChainStats {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Total prefixes: {}", self.total_prefixes)?;
		writeln!(f, "Unique suffixes: {}", self.unique_suffixes)?;
		writeln!(f, "Total suffixes: {}", self.total_suffixes)?;
		writeln!(f, "Complexity factor: {:.3}", self.complexity())?;
		writeln!(f, "Single response prefixes: {}", self.singleton_prefixes)?;
		writeln!(f, "Start of sentence suffixes: {}", self.start_suffixes)?;
		match &self.most_common {
			Some((prefix, count)) => write!(f, "Most common prefix: {} ({} suffixes total)", prefix, count),
			None => write!(f, "Most common prefix: none"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn stats_of_small_corpus() {
		let mut model = ChainModel::new(2).unwrap();
		model.learn("the cat sat\nthe cat ran\na dog sat\n");
		let stats = model.stats();

		// "   ", "  the", "the cat", "cat sat", "cat ran", "  a", "a dog", "dog sat"
		assert_eq!(stats.total_prefixes, 8);
		assert_eq!(stats.total_suffixes, 12);
		// start: {the, a}, "the cat": {sat, ran}, every other prefix a single word
		assert_eq!(stats.unique_suffixes, 2 + 1 + 2 + 1 + 1 + 1 + 1 + 1);
		assert_eq!(stats.start_suffixes, 2);
		assert_eq!(stats.singleton_prefixes, 5);
		assert_eq!(stats.most_common, Some(("the cat".to_owned(), 2)));
		assert!((stats.complexity() - 10.0 / 8.0).abs() < 1e-9);
	}

	#[test]
	fn empty_model_reports_nothing() {
		let stats = ChainModel::new(2).unwrap().stats();
		assert_eq!(stats, ChainStats::default());
		assert_eq!(stats.complexity(), 0.0);
		assert!(stats.to_string().ends_with("Most common prefix: none"));
	}
}
