/// Sentence boundary marker.
///
/// Fills the window at the start of a line and is recorded as the suffix that
/// ends a sentence. Learned words never contain whitespace, so a single space
/// can never collide with one.
pub const BOUNDARY: &str = " ";

/// Characters stripped from both ends of a word before it enters a prefix.
const TRIMMED: &[char] = &[',', '"', '\'', ':', '(', ')', '+', '-'];

/// Normalizes a word for use inside a prefix window.
///
/// Lowercases and strips surrounding quotes, brackets and similar noise so
/// that `"Hello,` and `hello` share the same prefix. The boundary marker is
/// passed through untouched.
pub fn normalize(word: &str) -> String {
	if word == BOUNDARY {
		return word.to_owned();
	}
	word.trim_matches(TRIMMED).to_lowercase()
}

/// Fixed-length window of the last `n` normalized words.
///
/// # Invariants
/// - `words.len()` never changes after construction
/// - Every slot is either `BOUNDARY` or the output of `normalize`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prefix {
	words: Vec<String>,
}

impl Prefix {
	/// The "start of sentence" window: `n` boundary markers.
	pub fn start(n: usize) -> Self {
		Self { words: vec![BOUNDARY.to_owned(); n] }
	}

	/// Builds a window from caller-supplied words.
	///
	/// Words are normalized. Only the last `n` are kept; shorter seeds are
	/// left-padded with the boundary marker.
	pub fn from_seed<S: AsRef<str>>(n: usize, seed: &[S]) -> Self {
		let mut prefix = Self::start(n);
		let skip = seed.len().saturating_sub(n);
		for word in &seed[skip..] {
			prefix.shift(word.as_ref());
		}
		prefix
	}

	/// Canonical lookup key: slots joined by a single space.
	pub fn key(&self) -> String {
		self.words.join(" ")
	}

	/// Drops the oldest word and appends `word` (normalized).
	pub fn shift(&mut self, word: &str) {
		if self.words.is_empty() {
			return;
		}
		self.words.rotate_left(1);
		if let Some(last) = self.words.last_mut() {
			*last = normalize(word);
		}
	}

	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}
}
