use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::state::State;

/// Fixed-order table of the n-gram model.
///
/// The `NGramTable` stores a `State` for every context of length `n-1`
/// observed in the training data and allows exact lookup of the
/// continuations of a context.
///
/// # Responsibilities
/// - Count every contiguous n-gram of a token sequence
/// - Resolve a context to its continuation counts
///
/// # Invariants
/// - `n` is always >= 2
/// - Every key in `contexts` has exactly `n - 1` tokens
/// - All continuation counts are >= 1
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct NGramTable {
	/// The order of the table (number of words in the n-gram)
	n: usize, // must be >= 2

	/// Mapping from a context (length n-1) to its continuation state
	contexts: HashMap<Vec<String>, State>,
}

impl NGramTable {
	/// Creates a new table of order `n`.
	///
	/// # Errors
	/// Returns an error if `n < 2`.
	pub(crate) fn new(n: usize) -> Result<Self, String> {
		if n < 2 {
			return Err("n must be >= 2".to_owned());
		}
		Ok(Self { n, contexts: HashMap::new() })
	}

	/// The order of this table.
	pub(crate) fn order(&self) -> usize {
		self.n
	}

	/// Counts every n-gram of order `n` in a token sequence.
	///
	/// Slides a window of `n` tokens across the sequence; each window is
	/// split into a context (all but the last token) and the target word
	/// following it, and the (context -> target) count is incremented.
	///
	/// # Notes
	/// - Sequences shorter than `n` produce no windows and leave the
	///   table untouched.
	pub(crate) fn add_tokens(&mut self, tokens: &[String]) {
		if tokens.len() < self.n {
			// Sequence too short, no n-grams to count
			return;
		}

		for window in tokens.windows(self.n) {
			// Impossible to panic, windows are of size n >= 2
			let (target, context) = window.split_last().unwrap();
			let state = self.contexts.entry(context.to_vec()).or_insert_with(State::new);
			state.record(target);
		}
	}

	/// Looks up the continuation state of an exact context.
	///
	/// Returns `None` if the context has the wrong length or was never
	/// observed.
	pub(crate) fn lookup(&self, context: &[String]) -> Option<&State> {
		if context.len() + 1 != self.n {
			return None;
		}
		self.contexts.get(context)
	}

	/// Iterates over all stored contexts and their states.
	pub(crate) fn contexts(&self) -> impl Iterator<Item = (&[String], &State)> {
		self.contexts.iter().map(|(context, state)| (context.as_slice(), state))
	}
}
