use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Continuation record of a single context in an n-gram table.
///
/// A `State` stores every word observed immediately after one fixed
/// context, with the number of times each continuation occurred, plus
/// the running total of all those counts.
///
/// ## Responsibilities
/// - Accumulate continuation occurrences during training
/// - Expose counts and the context total for smoothed scoring
///
/// ## Invariants
/// - Each continuation count is strictly positive
/// - `total` always equals the sum of all continuation counts
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct State {
	/// Observed continuations indexed by the next word.
	/// Example: { "world" => 42, "there" => 3 }
	continuations: HashMap<String, u64>,
	/// Sum of all continuation counts.
	total: u64,
}

impl State {
	/// Creates an empty state.
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Records one occurrence of `word` following this state's context.
	///
	/// - If the continuation already exists, its count is increased.
	/// - Otherwise, a new continuation is created with a count of 1.
	pub(crate) fn record(&mut self, word: &str) {
		*self.continuations.entry(word.to_owned()).or_insert(0) += 1;
		self.total += 1;
	}

	/// Total number of observations for this context.
	pub(crate) fn total(&self) -> u64 {
		self.total
	}

	/// Number of distinct continuation words.
	pub(crate) fn len(&self) -> usize {
		self.continuations.len()
	}

	/// Iterates over `(word, count)` pairs in table order.
	pub(crate) fn continuations(&self) -> impl Iterator<Item = (&str, u64)> {
		self.continuations.iter().map(|(word, count)| (word.as_str(), *count))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn record_counts_occurrences() {
		let mut state = State::new();
		state.record("world");
		state.record("world");
		state.record("there");

		assert_eq!(state.total(), 3);
		assert_eq!(state.len(), 2);

		let counts: HashMap<&str, u64> = state.continuations().collect();
		assert_eq!(counts["world"], 2);
		assert_eq!(counts["there"], 1);
	}

	#[test]
	fn total_tracks_the_sum_of_counts() {
		let mut state = State::new();
		for word in ["a", "b", "a", "c", "a"] {
			state.record(word);
		}
		let sum: u64 = state.continuations().map(|(_, count)| count).sum();
		assert_eq!(state.total(), sum);
	}
}
