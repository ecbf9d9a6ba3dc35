use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::store::{ModelStore, StoreError};
use super::word_model::{DEFAULT_ALPHA, Prediction, WordModel};

/// Default maximum n-gram order.
pub const DEFAULT_ORDER: usize = 3;

/// Default number of accumulated texts that triggers a retrain.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Tuning knobs of a prediction session.
///
/// serde-derived so embedders can read it from their configuration
/// format of choice. Validated when the session is constructed.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SessionConfig {
	/// Maximum n-gram order of the model (>= 2).
	pub order: usize,

	/// Additive smoothing constant (> 0).
	pub alpha: f64,

	/// Number of accumulated texts that triggers a retrain (>= 1).
	pub history_limit: usize,

	/// Whether history is cleared even when persisting the retrained
	/// model fails. `true` matches the historical behavior of clearing
	/// unconditionally; `false` retains the pending texts, which will
	/// then be part of the next retrain again.
	pub clear_history_on_persist_failure: bool,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			order: DEFAULT_ORDER,
			alpha: DEFAULT_ALPHA,
			history_limit: DEFAULT_HISTORY_LIMIT,
			clear_history_on_persist_failure: true,
		}
	}
}

impl SessionConfig {
	/// Checks that every knob is inside its documented range.
	fn validate(&self) -> Result<(), String> {
		if self.order < 2 {
			return Err("order must be >= 2".to_owned());
		}
		if !(self.alpha > 0.0 && self.alpha.is_finite()) {
			return Err("alpha must be a positive finite number".to_owned());
		}
		if self.history_limit == 0 {
			return Err("history_limit must be >= 1".to_owned());
		}
		Ok(())
	}
}

/// Notification emitted by a session after each significant phase.
#[derive(Clone, Debug)]
pub enum SessionEvent {
	/// A persisted model was loaded at construction.
	Loaded { vocabulary: usize, total_words: u64 },
	/// Loading failed and a fresh model was built instead.
	LoadFallback { reason: String },
	/// Pending history was joined and fed to the model.
	Retrained { texts: usize, total_words: u64 },
	/// The model was persisted.
	Persisted,
	/// Persisting the model failed.
	PersistFailed { reason: String },
	/// A prediction was served.
	Predicted { requested: usize, returned: usize },
}

/// Receives session notifications.
///
/// The session core stays silent apart from `tracing` diagnostics;
/// implement this to surface status to a UI or a log of your own.
/// Methods are invoked synchronously from the calling thread.
pub trait SessionObserver {
	fn on_event(&mut self, event: &SessionEvent);
}

/// Read-only snapshot of a session's model and buffer.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionStats {
	/// Number of distinct words in the model.
	pub vocabulary: usize,
	/// Total number of word occurrences the model has seen.
	pub total_words: u64,
	/// Maximum n-gram order of the model.
	pub order: usize,
	/// Number of texts waiting for the next retrain.
	pub history: usize,
}

/// Owns one model and drives its retraining and persistence.
///
/// # Responsibilities
/// - Load the persisted model at construction, or build a fresh one
/// - Buffer user-supplied texts up to a configured limit
/// - Retrain and persist when the buffer fills or on demand
/// - Serve predictions without touching model or history
///
/// # Notes
/// - Single-writer by construction: every mutating operation takes
///   `&mut self` and completes before returning.
/// - Store failures are reported through the observer and `tracing`,
///   never raised as fatal errors.
pub struct Session {
	model: WordModel,
	store: ModelStore,
	config: SessionConfig,
	history: Vec<String>,
	observer: Option<Box<dyn SessionObserver>>,
}

impl Session {
	/// Creates a session without an observer.
	///
	/// See [`Session::with_observer`].
	pub fn new(
		config: SessionConfig,
		store: ModelStore,
		initial_corpus: &[String],
	) -> Result<Self, String> {
		Self::with_observer(config, store, initial_corpus, None)
	}

	/// Creates a session, loading the persisted model if one exists.
	///
	/// # Parameters
	/// - `config`: validated before anything else.
	/// - `store`: location of the persisted model.
	/// - `initial_corpus`: texts used to pre-train a brand new model
	///   when no persisted model exists yet; ignored otherwise.
	/// - `observer`: optional receiver of session notifications.
	///
	/// # Behavior
	/// - A loadable persisted model is used as-is.
	/// - If no persisted model exists, a fresh model is trained on
	///   `initial_corpus` and persisted.
	/// - If the persisted model is corrupt, the session starts from a
	///   fresh empty model and leaves the file on disk untouched.
	///
	/// # Errors
	/// Returns an error only for an invalid configuration; store
	/// failures never fail construction.
	pub fn with_observer(
		config: SessionConfig,
		store: ModelStore,
		initial_corpus: &[String],
		observer: Option<Box<dyn SessionObserver>>,
	) -> Result<Self, String> {
		config.validate()?;

		let mut session = Self {
			model: WordModel::new(config.order, config.alpha)?,
			store,
			config,
			history: Vec::new(),
			observer,
		};

		match session.store.load() {
			Ok(model) => {
				info!(path = %session.store.path().display(), "loaded persisted model");
				session.notify(&SessionEvent::Loaded {
					vocabulary: model.vocabulary_size(),
					total_words: model.total_words(),
				});
				session.model = model;
			}
			Err(error @ StoreError::SourceNotFound { .. }) => {
				info!(%error, "starting from a fresh model");
				session.notify(&SessionEvent::LoadFallback { reason: error.to_string() });
				for text in initial_corpus {
					session.model.train(text);
				}
				// Reported by persist if it fails
				let _ = session.persist();
			}
			Err(error) => {
				warn!(%error, "could not load persisted model, starting fresh");
				session.notify(&SessionEvent::LoadFallback { reason: error.to_string() });
			}
		}

		Ok(session)
	}

	/// Appends a text to the pending history.
	///
	/// Reaching the configured history limit synchronously retrains the
	/// model on the whole buffer and persists it.
	pub fn accumulate(&mut self, text: impl Into<String>) {
		self.history.push(text.into());
		if self.history.len() >= self.config.history_limit {
			// Persistence failures are already reported by retrain
			let _ = self.retrain();
		}
	}

	/// Explicitly retrains on all pending history, as if the buffer had
	/// just filled up.
	///
	/// # Errors
	/// Returns the persistence failure, if any. Training itself always
	/// succeeds and is kept in memory regardless of the outcome.
	pub fn force_retrain(&mut self) -> Result<(), StoreError> {
		self.retrain()
	}

	/// Predicts the most probable next words for a context.
	///
	/// Does not mutate history or model.
	pub fn predict(&mut self, context: &str, num_predictions: usize) -> Vec<Prediction> {
		let predictions = self.model.predict_next(context, num_predictions);
		self.notify(&SessionEvent::Predicted {
			requested: num_predictions,
			returned: predictions.len(),
		});
		predictions
	}

	/// Snapshot of the model and buffer sizes.
	pub fn stats(&self) -> SessionStats {
		SessionStats {
			vocabulary: self.model.vocabulary_size(),
			total_words: self.model.total_words(),
			order: self.model.order(),
			history: self.history.len(),
		}
	}

	/// Drops all pending history without retraining.
	pub fn clear_history(&mut self) {
		self.history.clear();
	}

	/// Retrains the model on all pending history, then persists it.
	///
	/// # Behavior
	/// - An empty history is a no-op, not an error.
	/// - The pending texts are joined with single spaces and fed to the
	///   model as one training block.
	/// - History is cleared after training and the persistence attempt;
	///   on a failed save, clearing follows
	///   `clear_history_on_persist_failure`.
	fn retrain(&mut self) -> Result<(), StoreError> {
		if self.history.is_empty() {
			return Ok(());
		}

		let joined = self.history.join(" ");
		self.model.train(&joined);
		info!(texts = self.history.len(), total_words = self.model.total_words(), "retrained model");
		self.notify(&SessionEvent::Retrained {
			texts: self.history.len(),
			total_words: self.model.total_words(),
		});

		let result = self.persist();
		if result.is_ok() || self.config.clear_history_on_persist_failure {
			self.history.clear();
		}
		result
	}

	/// Persists the current model, reporting any failure.
	fn persist(&mut self) -> Result<(), StoreError> {
		match self.store.save(&self.model) {
			Ok(()) => {
				self.notify(&SessionEvent::Persisted);
				Ok(())
			}
			Err(error) => {
				warn!(%error, "failed to persist model");
				self.notify(&SessionEvent::PersistFailed { reason: error.to_string() });
				Err(error)
			}
		}
	}

	fn notify(&mut self, event: &SessionEvent) {
		if let Some(observer) = self.observer.as_mut() {
			observer.on_event(event);
		}
	}
}
