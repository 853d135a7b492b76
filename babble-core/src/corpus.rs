use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use crate::chain::ChainModel;
use crate::io::{append_line, list_files_recursive, read_lines};

/// Directory, under the archive root, holding one file per user.
const USERS_DIR: &str = "users";

/// Plain-text corpus on disk.
///
/// Every `*.txt` file below the root is training text, one sentence or
/// message per line. Messages heard at runtime are appended to
/// `users/<user id>.txt` so the next start learns them again.
#[derive(Clone, Debug)]
pub struct Archive {
	root: PathBuf,
}

impl Archive {
	/// Opens an archive rooted at `root`, creating the directories if needed.
	pub fn open<P: AsRef<Path>>(root: P) -> io::Result<Self> {
		let archive = Self { root: root.as_ref().to_path_buf() };
		std::fs::create_dir_all(archive.users_dir())?;
		Ok(archive)
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn users_dir(&self) -> PathBuf {
		self.root.join(USERS_DIR)
	}

	/// Learns every text file of the archive into `model`.
	///
	/// Unreadable files are logged and skipped. Returns how many files were
	/// learned.
	///
	/// # Errors
	/// Fails only if the archive directory itself cannot be listed.
	pub fn load_into(&self, model: &mut ChainModel) -> io::Result<usize> {
		let mut lines = Vec::new();
		let mut loaded = 0;

		for path in list_files_recursive(&self.root, "txt")? {
			match read_lines(&path) {
				Ok(file_lines) => {
					log::info!("loading {} ({} lines)", path.display(), file_lines.len());
					lines.extend(file_lines);
					loaded += 1;
				}
				Err(e) => log::warn!("could not read {}: {}", path.display(), e),
			}
		}

		let learned = learn_parallel(model, lines);
		if let Err(e) = model.merge(&learned) {
			// Both sides come from `model`'s own configuration.
			log::error!("could not merge archive into model: {}", e);
		}

		Ok(loaded)
	}

	/// Appends a message to the user's archive file.
	///
	/// Empty messages are ignored.
	///
	/// # Errors
	/// Rejects user ids that could escape the users directory, and reports
	/// I/O failures.
	pub fn record(&self, user_id: &str, text: &str) -> io::Result<()> {
		if text.trim().is_empty() {
			return Ok(());
		}
		if user_id.is_empty() || user_id.contains(['/', '\\']) || user_id.contains("..") {
			return Err(io::Error::new(
				io::ErrorKind::InvalidInput,
				format!("invalid user id: {:?}", user_id),
			));
		}

		let path = self.users_dir().join(format!("{}.txt", user_id));
		// One message per line, as the loader expects.
		for line in text.lines().filter(|l| !l.trim().is_empty()) {
			append_line(&path, line)?;
		}
		Ok(())
	}
}

/// Learns `lines` into a fresh model shaped like `template`.
///
/// Splits the lines into chunks (CPU cores * factor), learns each chunk on
/// its own thread, and merges the partial models as they arrive. Counts are
/// summed, so the result equals sequential learning.
fn learn_parallel(template: &ChainModel, lines: Vec<String>) -> ChainModel {
	let mut final_model = template.empty_like();
	if lines.is_empty() {
		return final_model;
	}

	let cpus = num_cpus::get();
	let factor = 8;
	let chunks = cpus * factor;
	let chunk_size = lines.len().div_ceil(chunks);

	let (tx, rx) = mpsc::channel();
	for chunk in lines.chunks(chunk_size) {
		let tx = tx.clone();
		let chunk: Vec<String> = chunk.to_vec();
		let mut partial_model = template.empty_like();

		thread::spawn(move || {
			for line in &chunk {
				partial_model.learn(line);
			}
			// The receiver outlives every sender.
			let _ = tx.send(partial_model);
		});
	}
	drop(tx);

	for partial_model in rx.iter() {
		if let Err(e) = final_model.merge(&partial_model) {
			log::error!("could not merge partial model: {}", e);
		}
	}

	final_model
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	#[test]
	fn parallel_learning_matches_sequential() {
		let lines: Vec<String> = (0..500)
			.map(|i| format!("word{} shared tail {} end", i % 7, i % 3))
			.collect();

		let mut sequential = ChainModel::new(2).unwrap();
		for line in &lines {
			sequential.learn(line);
		}

		let template = ChainModel::new(2).unwrap();
		assert_eq!(learn_parallel(&template, lines), sequential);
	}

	#[test]
	fn load_reads_nested_files() {
		let dir = tempfile::tempdir().unwrap();
		let archive = Archive::open(dir.path()).unwrap();
		fs::write(dir.path().join("book.txt"), "the cat sat\n").unwrap();
		fs::create_dir_all(dir.path().join("misc")).unwrap();
		fs::write(dir.path().join("misc").join("more.txt"), "a dog ran").unwrap();
		fs::write(dir.path().join("ignored.md"), "not corpus").unwrap();

		let mut model = ChainModel::new(2).unwrap();
		assert_eq!(archive.load_into(&mut model).unwrap(), 2);

		let start = model.suffixes("   ").unwrap();
		assert_eq!(start.count("the"), 1);
		assert_eq!(start.count("a"), 1);
		assert_eq!(start.count("not"), 0);
	}

	#[test]
	fn recorded_messages_are_loaded_back() {
		let dir = tempfile::tempdir().unwrap();
		let archive = Archive::open(dir.path()).unwrap();
		archive.record("1234", "hello there").unwrap();
		archive.record("1234", "general kenobi\n\n").unwrap();
		archive.record("1234", "   ").unwrap();

		let content = fs::read_to_string(archive.users_dir().join("1234.txt")).unwrap();
		assert_eq!(content, "hello there\ngeneral kenobi\n");

		let mut model = ChainModel::new(1).unwrap();
		assert_eq!(archive.load_into(&mut model).unwrap(), 1);
		assert_eq!(model.next_word("hello").unwrap(), "there");
	}

	#[test]
	fn record_rejects_path_like_ids() {
		let dir = tempfile::tempdir().unwrap();
		let archive = Archive::open(dir.path()).unwrap();
		for id in ["", "../evil", "a/b", "a\\b"] {
			let err = archive.record(id, "text").unwrap_err();
			assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
		}
	}

	#[test]
	fn missing_archive_directory_fails() {
		let dir = tempfile::tempdir().unwrap();
		let archive = Archive { root: dir.path().join("gone") };
		let mut model = ChainModel::new(2).unwrap();
		assert!(archive.load_into(&mut model).is_err());
	}
}
