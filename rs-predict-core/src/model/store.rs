use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::io::write_atomic;
use super::word_model::WordModel;

/// Magic bytes identifying a persisted model file.
const MAGIC: [u8; 4] = *b"RPWM";

/// Current on-disk format version.
const FORMAT_VERSION: u8 = 1;

/// Errors raised by model persistence.
#[derive(Debug, Error)]
pub enum StoreError {
	/// No persisted model exists at the configured location.
	#[error("no persisted model at {path:?}")]
	SourceNotFound { path: PathBuf },

	/// The persisted bytes cannot be decoded into a valid model.
	#[error("persisted model at {path:?} is corrupt or incompatible: {reason}")]
	Corrupt { path: PathBuf, reason: String },

	/// Serializing or writing the model to disk failed.
	#[error("failed to write model to {path:?}")]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Handle to one on-disk model location.
///
/// The store is persistence only: it encodes the full model state
/// behind a small self-describing header and reads it back. The file
/// layout is 4 magic bytes, a format version byte, then the postcard
/// encoding of the model.
///
/// # Notes
/// - Saves go to a temporary sibling file which is atomically renamed
///   over the target, so a reader never observes a partial file.
/// - Loaded models are checked against the model invariants before
///   being handed back.
#[derive(Debug, Clone)]
pub struct ModelStore {
	path: PathBuf,
}

impl ModelStore {
	/// Creates a store bound to `path`.
	pub fn new<P: AsRef<Path>>(path: P) -> Self {
		Self { path: path.as_ref().to_path_buf() }
	}

	/// Location this store reads from and writes to.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Serializes and persists the full model state.
	///
	/// # Errors
	/// Returns `StoreError::Write` on any serialization or I/O failure.
	pub fn save(&self, model: &WordModel) -> Result<(), StoreError> {
		let payload = postcard::to_stdvec(model).map_err(|e| StoreError::Write {
			path: self.path.clone(),
			source: std::io::Error::new(ErrorKind::InvalidData, e),
		})?;

		let mut bytes = Vec::with_capacity(MAGIC.len() + 1 + payload.len());
		bytes.extend_from_slice(&MAGIC);
		bytes.push(FORMAT_VERSION);
		bytes.extend_from_slice(&payload);

		write_atomic(&self.path, &bytes).map_err(|e| StoreError::Write {
			path: self.path.clone(),
			source: e,
		})
	}

	/// Loads a previously persisted model.
	///
	/// # Errors
	/// - `StoreError::SourceNotFound` if the file is absent or empty.
	/// - `StoreError::Corrupt` if the header or payload cannot be
	///   decoded, or the decoded state violates the model invariants.
	pub fn load(&self) -> Result<WordModel, StoreError> {
		let bytes = match fs::read(&self.path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => {
				return Err(StoreError::SourceNotFound { path: self.path.clone() });
			}
			Err(e) => return Err(self.corrupt(format!("unreadable: {e}"))),
		};

		if bytes.is_empty() {
			return Err(StoreError::SourceNotFound { path: self.path.clone() });
		}
		if bytes.len() < MAGIC.len() + 1 {
			return Err(self.corrupt("truncated header".to_owned()));
		}
		if bytes[..MAGIC.len()] != MAGIC {
			return Err(self.corrupt("bad magic bytes".to_owned()));
		}
		let version = bytes[MAGIC.len()];
		if version != FORMAT_VERSION {
			return Err(self.corrupt(format!("unsupported format version {version}")));
		}

		let model: WordModel = postcard::from_bytes(&bytes[MAGIC.len() + 1..])
			.map_err(|e| self.corrupt(e.to_string()))?;
		model.validate().map_err(|reason| self.corrupt(reason))?;

		Ok(model)
	}

	fn corrupt(&self, reason: String) -> StoreError {
		StoreError::Corrupt { path: self.path.clone(), reason }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::word_model::WordModel;

	fn trained_model() -> WordModel {
		let mut model = WordModel::new(3, 0.1).unwrap();
		model.train("the quick brown fox jumps over the lazy dog");
		model.train("the quick brown cat naps");
		model
	}

	#[test]
	fn round_trip_preserves_predictions() {
		let dir = tempfile::tempdir().unwrap();
		let store = ModelStore::new(dir.path().join("model.dat"));

		let model = trained_model();
		store.save(&model).unwrap();
		let reloaded = store.load().unwrap();

		assert_eq!(reloaded.order(), model.order());
		assert_eq!(reloaded.total_words(), model.total_words());
		assert_eq!(reloaded.vocabulary_size(), model.vocabulary_size());

		for context in ["", "the", "the quick", "quick brown", "unseen words"] {
			let expected = model.predict_next(context, 5);
			let actual = reloaded.predict_next(context, 5);
			assert_eq!(expected.len(), actual.len());
			for (e, a) in expected.iter().zip(actual.iter()) {
				assert_eq!(e.word, a.word);
				assert!((e.probability - a.probability).abs() < 1e-12);
			}
		}
	}

	#[test]
	fn missing_file_is_source_not_found() {
		let dir = tempfile::tempdir().unwrap();
		let store = ModelStore::new(dir.path().join("absent.dat"));
		assert!(matches!(store.load(), Err(StoreError::SourceNotFound { .. })));
	}

	#[test]
	fn empty_file_is_source_not_found() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("empty.dat");
		fs::write(&path, b"").unwrap();

		let store = ModelStore::new(&path);
		assert!(matches!(store.load(), Err(StoreError::SourceNotFound { .. })));
	}

	#[test]
	fn garbage_bytes_are_corrupt() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("garbage.dat");
		fs::write(&path, b"definitely not a model").unwrap();

		let store = ModelStore::new(&path);
		assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
	}

	#[test]
	fn unknown_format_version_is_corrupt() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("model.dat");
		let store = ModelStore::new(&path);
		store.save(&trained_model()).unwrap();

		let mut bytes = fs::read(&path).unwrap();
		bytes[MAGIC.len()] = FORMAT_VERSION + 1;
		fs::write(&path, &bytes).unwrap();

		assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
	}

	#[test]
	fn truncated_payload_is_corrupt() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("model.dat");
		let store = ModelStore::new(&path);
		store.save(&trained_model()).unwrap();

		let bytes = fs::read(&path).unwrap();
		fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

		assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
	}

	#[test]
	fn unwritable_location_is_a_write_failure() {
		let dir = tempfile::tempdir().unwrap();
		let store = ModelStore::new(dir.path().join("missing").join("model.dat"));
		assert!(matches!(store.save(&trained_model()), Err(StoreError::Write { .. })));
	}

	#[test]
	fn save_leaves_no_temporary_file() {
		let dir = tempfile::tempdir().unwrap();
		let store = ModelStore::new(dir.path().join("model.dat"));
		store.save(&trained_model()).unwrap();
		store.save(&trained_model()).unwrap();

		assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
	}
}
