use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::fs;

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Writes `bytes` to `path` with atomic visibility.
///
/// The data is first written to a temporary sibling file, which is then
/// renamed over the target. A concurrent reader sees either the old
/// content or the new one, never a partially written file.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
	let mut tmp_name = path.as_os_str().to_owned();
	tmp_name.push(".tmp");
	let tmp = PathBuf::from(tmp_name);

	fs::write(&tmp, bytes)?;
	if let Err(e) = fs::rename(&tmp, path) {
		// Best effort: do not leave the temporary file behind
		let _ = fs::remove_file(&tmp);
		return Err(e);
	}
	Ok(())
}
