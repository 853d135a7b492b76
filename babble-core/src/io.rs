use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Invalid UTF-8 is replaced rather than rejected
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_lines<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let bytes = fs::read(filename)?;
	Ok(String::from_utf8_lossy(&bytes).lines().map(str::to_owned).collect())
}

/// Appends `line` and a newline to a file, creating it if needed.
pub(crate) fn append_line<P: AsRef<Path>>(filename: P, line: &str) -> io::Result<()> {
	let mut file = OpenOptions::new().create(true).append(true).open(filename)?;
	writeln!(file, "{}", line)
}

/// Recursively lists every file with a given extension under `dir`.
///
/// Symbolic links are not followed, so a link cycle cannot list a file
/// twice. Unreadable entries below the root are logged and skipped.
///
/// Returns full paths, sorted by file name within each directory.
pub(crate) fn list_files_recursive<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<PathBuf>> {
	let mut files = Vec::new();

	for entry in WalkDir::new(dir).sort_by_file_name() {
		let entry = match entry {
			Ok(entry) => entry,
			Err(e) if e.depth() == 0 => return Err(e.into()),
			Err(e) => {
				log::warn!("skipping unreadable archive entry: {}", e);
				continue;
			}
		};
		if entry.file_type().is_file() && entry.path().extension() == Some(OsStr::new(extension)) {
			files.push(entry.into_path());
		}
	}

	Ok(files)
}
