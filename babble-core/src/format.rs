//! Makes raw generated words presentable.
//!
//! The first real word gets a capital letter, the last one gets a sentence
//! terminator. Tokens that are not words (punctuation, emoji, links) are
//! left alone and skipped over.

use rand::Rng;
use rand::seq::IndexedRandom;
use unicode_categories::UnicodeCategories;

/// Characters accepted at the end of a sentence.
pub const TERMINATORS: [char; 3] = ['!', '.', '?'];

/// Trailing characters removed before a terminator is considered.
const DANGLING: [char; 1] = [','];

/// Returns `true` if `word` contains a letter and does not look like a link.
///
/// The link check is a deliberately crude heuristic: anything starting with
/// `http` or `www`, or containing `.com`.
pub fn is_word(word: &str) -> bool {
	if !word.chars().any(char::is_alphabetic) {
		return false;
	}
	!(word.starts_with("http") || word.starts_with("www") || word.contains(".com"))
}

/// Uppercases the first letter of `word`, keeping everything else as is.
pub fn capitalize(word: &str) -> String {
	match word.char_indices().find(|(_, c)| c.is_alphabetic()) {
		Some((i, c)) => {
			let mut capped = String::with_capacity(word.len());
			capped.push_str(&word[..i]);
			capped.extend(c.to_uppercase());
			capped.push_str(&word[i + c.len_utf8()..]);
			capped
		}
		None => word.to_owned(),
	}
}

/// Ends `word` with a sentence terminator.
///
/// Scans from the end: an existing terminator is kept, trailing commas are
/// dropped, any other Unicode punctuation (categories P*) is left untouched
/// and no terminator is added. Otherwise a terminator is picked at random
/// from `TERMINATORS`; symbols such as `+`, `$` or `~` are not punctuation
/// and get one too.
pub fn punctuate_with<R: Rng + ?Sized>(word: &str, rng: &mut R) -> String {
	let mut punctuated = word.to_owned();

	while let Some(last) = punctuated.chars().last() {
		if TERMINATORS.contains(&last) {
			break;
		}
		if DANGLING.contains(&last) {
			punctuated.pop();
			continue;
		}
		if last.is_punctuation() {
			break;
		}
		if let Some(end) = TERMINATORS.choose(rng) {
			punctuated.push(*end);
		}
		break;
	}

	punctuated
}

/// `punctuate_with` using the thread-local generator.
pub fn punctuate(word: &str) -> String {
	punctuate_with(word, &mut rand::rng())
}

/// Capitalizes the first real word and, for more than one token,
/// punctuates the last real word.
pub fn prettify_with<S: AsRef<str>, R: Rng + ?Sized>(words: &[S], rng: &mut R) -> Vec<String> {
	let mut pretty: Vec<String> = words.iter().map(|w| w.as_ref().to_owned()).collect();

	if let Some(first) = pretty.iter_mut().find(|w| is_word(w)) {
		*first = capitalize(first);
	}

	if pretty.len() > 1 {
		if let Some(last) = pretty.iter_mut().rev().find(|w| is_word(w)) {
			*last = punctuate_with(last, rng);
		}
	}

	pretty
}

/// Prettifies `words` and joins them with single spaces.
pub fn format_with<S: AsRef<str>, R: Rng + ?Sized>(words: &[S], rng: &mut R) -> String {
	prettify_with(words, rng).join(" ")
}

/// `format_with` using the thread-local generator.
pub fn format<S: AsRef<str>>(words: &[S]) -> String {
	format_with(words, &mut rand::rng())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ends_with_terminator(s: &str) -> bool {
		s.chars().last().is_some_and(|c| TERMINATORS.contains(&c))
	}

	#[test]
	fn words_need_letters_and_no_links() {
		let cases = [
			("", false),
			("1", false),
			("hello", true),
			("\"", false),
			("\"hello\"", true),
			("!!!", false),
			("!!!!!!!", false),
			("https://www.whatever.com", false),
			("www.things.com", false),
			("http://hellobaby.com", false),
			("café", true),
		];
		for (word, expected) in cases {
			assert_eq!(is_word(word), expected, "is_word({:?})", word);
		}
	}

	#[test]
	fn capitalize_first_letter_only() {
		let cases = [
			("hello", "Hello"),
			("", ""),
			("123", "123"),
			("\"hello\"", "\"Hello\""),
			("Hello", "Hello"),
			("élan", "Élan"),
			("(wow)", "(Wow)"),
		];
		for (word, expected) in cases {
			assert_eq!(capitalize(word), expected);
		}
	}

	#[test]
	fn punctuate_keeps_existing_terminator() {
		assert_eq!(punctuate("done!"), "done!");
		assert_eq!(punctuate("really?"), "really?");
	}

	#[test]
	fn punctuate_drops_dangling_commas() {
		let out = punctuate("well,,");
		assert!(out.starts_with("well"));
		assert!(!out.contains(','));
		assert!(ends_with_terminator(&out));
		assert_eq!(punctuate("ok.,"), "ok.");
	}

	#[test]
	fn punctuate_leaves_other_punctuation_alone() {
		assert_eq!(punctuate("word)"), "word)");
		assert_eq!(punctuate("\"quoted\""), "\"quoted\"");
		assert_eq!(punctuate("wait;"), "wait;");
		assert_eq!(punctuate("word。"), "word。");
		assert_eq!(punctuate("what‽"), "what‽");
		assert_eq!(punctuate("«quoi»"), "«quoi»");
	}

	#[test]
	fn punctuate_terminates_after_symbols() {
		for word in ["hey~", "c++", "cost$"] {
			let out = punctuate(word);
			assert!(out.starts_with(word), "got {}", out);
			assert_eq!(out.chars().count(), word.chars().count() + 1, "got {}", out);
			assert!(ends_with_terminator(&out), "got {}", out);
		}
	}

	#[test]
	fn single_word_is_only_capitalized() {
		assert_eq!(format(&["hello"]), "Hello");
	}

	#[test]
	fn sentence_gets_capital_and_terminator() {
		let out = format(&["the", "cat", "sat"]);
		assert!(["The cat sat.", "The cat sat!", "The cat sat?"].contains(&out.as_str()), "got {}", out);
	}

	#[test]
	fn links_are_skipped() {
		let out = format(&["see", "http://x.com"]);
		assert!(out.starts_with("See"));
		assert!(out.ends_with(" http://x.com"));
		assert!(ends_with_terminator(out.trim_end_matches(" http://x.com")));

		let out = format(&["http://x.com", "look", "here", "www.y.com"]);
		assert!(out.starts_with("http://x.com Look here"));
		assert!(out.ends_with(" www.y.com"));
		assert!(ends_with_terminator(out.trim_end_matches(" www.y.com")));
	}

	#[test]
	fn non_words_are_untouched() {
		assert_eq!(format(&["!!!", "123"]), "!!! 123");
		assert_eq!(format::<&str>(&[]), "");
	}
}
