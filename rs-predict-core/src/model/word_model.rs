use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::ngram_table::NGramTable;
use super::tokenizer::tokenize;

/// Default additive smoothing constant.
pub const DEFAULT_ALPHA: f64 = 0.1;

/// A single ranked next-word candidate.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Prediction {
	/// The predicted next word.
	pub word: String,
	/// Probability mass assigned to the word, cumulative across all
	/// matching n-gram orders.
	pub probability: f64,
}

/// The top-level next-word model containing the n-gram tables for
/// orders 2..N and the word-level statistics used for smoothing.
///
/// This struct manages:
/// - `ngrams`: a map from n-gram order to its corresponding `NGramTable`.
/// - `unigrams`: occurrence count of every word across all training text.
/// - `total_words`: running sum of all unigram counts.
/// - `vocabulary`: every distinct word ever observed.
///
/// # Responsibilities
/// - Ingest training text and accumulate counts for every order
/// - Predict ranked next-word candidates for a context, backing off
///   from the longest usable context down to bigrams and padding with
///   raw word frequency
///
/// # Invariants
/// - `order` is always >= 2 and `alpha` > 0
/// - `total_words` equals the sum of all unigram counts
/// - Every word in any table key or continuation is in `vocabulary`
/// - The model is mutated only by `train`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WordModel {
	/// Maximum n-gram order considered during training and prediction
	order: usize, // must be >= 2

	/// Additive smoothing constant
	alpha: f64, // must be > 0

	/// One continuation table per order, created lazily on first use
	ngrams: HashMap<usize, NGramTable>,

	/// Occurrence count of every word across all training text
	unigrams: HashMap<String, u64>,

	/// Sum of all unigram counts
	total_words: u64,

	/// Every distinct word ever observed
	vocabulary: HashSet<String>,
}

impl WordModel {
	/// Creates an empty model of maximum order `order` with smoothing
	/// constant `alpha`.
	///
	/// # Errors
	/// Returns an error if `order < 2` or `alpha` is not a positive
	/// finite number.
	pub fn new(order: usize, alpha: f64) -> Result<Self, String> {
		if order < 2 {
			return Err("order must be >= 2".to_owned());
		}
		if !(alpha > 0.0 && alpha.is_finite()) {
			return Err("alpha must be a positive finite number".to_owned());
		}
		Ok(Self {
			order,
			alpha,
			ngrams: HashMap::new(),
			unigrams: HashMap::new(),
			total_words: 0,
			vocabulary: HashSet::new(),
		})
	}

	/// Maximum n-gram order of this model.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Additive smoothing constant of this model.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Number of distinct words observed so far.
	pub fn vocabulary_size(&self) -> usize {
		self.vocabulary.len()
	}

	/// Total number of word occurrences observed so far.
	pub fn total_words(&self) -> u64 {
		self.total_words
	}

	/// Trains the model on a block of text.
	///
	/// # Behavior
	/// - Tokenizes the text; an empty token sequence is a no-op.
	/// - Adds every token to the vocabulary and the unigram counts.
	/// - For each order 2..N, slides a window of that size across the
	///   token sequence and increments the (context -> target) count of
	///   the matching table, creating tables and contexts on first use.
	pub fn train(&mut self, text: &str) {
		let tokens = tokenize(text);
		if tokens.is_empty() {
			// Nothing to learn from empty or punctuation-only input
			return;
		}

		for token in &tokens {
			self.vocabulary.insert(token.clone());
			*self.unigrams.entry(token.clone()).or_insert(0) += 1;
		}
		self.total_words += tokens.len() as u64;

		// For each n-gram order
		for n in 2..=self.order {
			// Impossible to panic, orders are initialized >= 2
			let table = self.ngrams.entry(n).or_insert_with(|| NGramTable::new(n).unwrap());
			table.add_tokens(&tokens);
		}
	}

	/// Predicts the most probable next words for a context.
	///
	/// # Parameters
	/// - `context`: raw context text; tokenized like training input.
	/// - `num_predictions`: maximum number of candidates to return.
	///
	/// # Returns
	/// Ranked candidates, most probable first, at most
	/// `num_predictions` long. Ties are broken lexicographically.
	///
	/// # Behavior
	/// - An empty context ranks words by raw unigram frequency.
	/// - Otherwise, orders are visited from the longest usable context
	///   down to bigrams; every order whose table contains the trailing
	///   context contributes the smoothed probability
	///   `(count + alpha) / (total + alpha * vocabulary)` of each of its
	///   continuations, accumulated additively per word. Descent stops
	///   once enough distinct candidates were collected.
	/// - If the orders supplied fewer candidates than requested, the
	///   remaining slots are filled with the most frequent words not yet
	///   proposed, scored with their smoothed unigram probability.
	///
	/// # Notes
	/// - Never fails: absence of data degrades to frequency-based
	///   answers or an empty vector.
	/// - Read-only: the model is not modified.
	pub fn predict_next(&self, context: &str, num_predictions: usize) -> Vec<Prediction> {
		if num_predictions == 0 {
			return Vec::new();
		}

		let tokens = tokenize(context);
		if tokens.is_empty() {
			return self.most_frequent(num_predictions);
		}

		let mut candidates: HashMap<String, f64> = HashMap::new();
		let vocab_size = self.vocabulary.len() as f64;

		// Back off from the longest usable context down to bigrams,
		// accumulating smoothed mass across every matching order
		let mut n = self.order.min(tokens.len() + 1);
		while n >= 2 {
			let trailing = &tokens[tokens.len() - (n - 1)..];
			if let Some(state) = self.ngrams.get(&n).and_then(|table| table.lookup(trailing)) {
				let denominator = state.total() as f64 + self.alpha * vocab_size;
				for (word, count) in state.continuations() {
					*candidates.entry(word.to_owned()).or_insert(0.0) +=
						(count as f64 + self.alpha) / denominator;
				}
			}
			if candidates.len() >= num_predictions {
				break;
			}
			n -= 1;
		}

		if candidates.len() < num_predictions {
			self.backfill(&mut candidates, num_predictions);
		}

		let mut ranked: Vec<Prediction> = candidates
			.into_iter()
			.map(|(word, probability)| Prediction { word, probability })
			.collect();
		Self::rank(&mut ranked);
		ranked.truncate(num_predictions);
		ranked
	}

	/// Ranks words by raw unigram frequency.
	///
	/// Used for empty contexts. Probabilities are plain relative
	/// frequencies (`count / total_words`).
	fn most_frequent(&self, num_predictions: usize) -> Vec<Prediction> {
		let mut counts: Vec<(&String, u64)> =
			self.unigrams.iter().map(|(word, count)| (word, *count)).collect();
		counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

		let total = if self.total_words == 0 { 1.0 } else { self.total_words as f64 };
		counts
			.into_iter()
			.take(num_predictions)
			.map(|(word, count)| Prediction {
				word: word.clone(),
				probability: count as f64 / total,
			})
			.collect()
	}

	/// Tops up the candidate set with the most frequent words not
	/// already proposed by an n-gram order.
	///
	/// Each added word gets its smoothed unigram probability; existing
	/// candidates are never overwritten.
	fn backfill(&self, candidates: &mut HashMap<String, f64>, num_predictions: usize) {
		let mut counts: Vec<(&String, u64)> =
			self.unigrams.iter().map(|(word, count)| (word, *count)).collect();
		counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

		let vocab_size = self.vocabulary.len().max(1) as f64;
		let denominator = self.total_words as f64 + self.alpha * vocab_size;
		for (word, count) in counts {
			if candidates.len() >= num_predictions {
				break;
			}
			if candidates.contains_key(word.as_str()) {
				continue;
			}
			candidates.insert(word.clone(), (count as f64 + self.alpha) / denominator);
		}
	}

	/// Sorts predictions by probability descending, ties broken
	/// lexicographically on the word.
	fn rank(predictions: &mut [Prediction]) {
		predictions.sort_by(|a, b| {
			b.probability
				.total_cmp(&a.probability)
				.then_with(|| a.word.cmp(&b.word))
		});
	}

	/// Checks the internal consistency of a deserialized model.
	///
	/// # Errors
	/// Returns a description of the first violated invariant.
	pub(crate) fn validate(&self) -> Result<(), String> {
		if self.order < 2 {
			return Err("order must be >= 2".to_owned());
		}
		if !(self.alpha > 0.0 && self.alpha.is_finite()) {
			return Err("alpha must be a positive finite number".to_owned());
		}

		let unigram_sum: u64 = self.unigrams.values().sum();
		if unigram_sum != self.total_words {
			return Err("unigram counts do not sum to the total word count".to_owned());
		}

		for (n, table) in &self.ngrams {
			if table.order() != *n || *n < 2 || *n > self.order {
				return Err(format!("table of order {} is out of place", table.order()));
			}
			for (context, state) in table.contexts() {
				if context.len() + 1 != *n {
					return Err(format!("order-{n} context of length {}", context.len()));
				}
				if state.len() == 0 || state.total() == 0 {
					return Err(format!("empty continuation state at order {n}"));
				}
				if !context.iter().all(|word| self.vocabulary.contains(word)) {
					return Err("context word missing from vocabulary".to_owned());
				}
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn rejects_invalid_parameters() {
		assert!(WordModel::new(1, 0.1).is_err());
		assert!(WordModel::new(3, 0.0).is_err());
		assert!(WordModel::new(3, -1.0).is_err());
		assert!(WordModel::new(3, f64::NAN).is_err());
		assert!(WordModel::new(2, 0.1).is_ok());
	}

	#[test]
	fn training_twice_doubles_every_count() {
		let mut model = WordModel::new(3, DEFAULT_ALPHA).unwrap();
		let text = "to be or not to be";
		model.train(text);
		let first = model.clone();
		model.train(text);

		assert_eq!(model.total_words, first.total_words * 2);
		for (word, count) in &first.unigrams {
			assert_eq!(model.unigrams[word], count * 2);
		}
		for (n, table) in &first.ngrams {
			let retrained = model.ngrams.get(n).unwrap();
			for (context, state) in table.contexts() {
				let after = retrained.lookup(context).unwrap();
				assert_eq!(after.total(), state.total() * 2);
				let counts: HashMap<&str, u64> = after.continuations().collect();
				for (word, count) in state.continuations() {
					assert_eq!(counts[word], count * 2);
				}
			}
		}
	}

	#[test]
	fn unigram_counts_sum_to_total_words() {
		let mut model = WordModel::new(4, DEFAULT_ALPHA).unwrap();
		model.train("the quick brown fox jumps over the lazy dog");
		model.train("the dog barks");
		model.train("");

		let sum: u64 = model.unigrams.values().sum();
		assert_eq!(sum, model.total_words);
		assert_eq!(model.total_words, 12);
	}

	#[test]
	fn empty_training_input_is_a_no_op() {
		let mut model = WordModel::new(3, DEFAULT_ALPHA).unwrap();
		model.train("...!!!");
		model.train("");

		assert_eq!(model.total_words, 0);
		assert_eq!(model.vocabulary_size(), 0);
		assert!(model.ngrams.is_empty());
	}

	#[test]
	fn context_keys_always_have_order_minus_one_tokens() {
		let mut model = WordModel::new(4, DEFAULT_ALPHA).unwrap();
		model.train("one two three four five six");
		model.train("seven eight");

		for (n, table) in &model.ngrams {
			for (context, _) in table.contexts() {
				assert_eq!(context.len(), n - 1);
			}
		}
	}

	#[test]
	fn every_counted_word_is_in_the_vocabulary() {
		let mut model = WordModel::new(3, DEFAULT_ALPHA).unwrap();
		model.train("the cat sat on the mat");

		for (_, table) in &model.ngrams {
			for (context, state) in table.contexts() {
				for word in context {
					assert!(model.vocabulary.contains(word));
				}
				for (word, _) in state.continuations() {
					assert!(model.vocabulary.contains(word));
				}
			}
		}
	}

	#[test]
	fn smoothed_probabilities_normalize_within_one_order() {
		let mut model = WordModel::new(2, DEFAULT_ALPHA).unwrap();
		model.train("the cat sat on the mat the cat slept");

		let table = model.ngrams.get(&2).unwrap();
		let state = table.lookup(&["the".to_owned()]).unwrap();
		let total = state.total() as f64;
		let vocab = model.vocabulary.len() as f64;

		// Seen continuations plus alpha mass for every unseen word
		let seen: f64 = state.continuations().map(|(_, count)| count as f64 + model.alpha).sum();
		let unseen = (vocab - state.len() as f64) * model.alpha;
		let sum = (seen + unseen) / (total + model.alpha * vocab);

		assert!(close(sum, 1.0));
	}

	#[test]
	fn empty_context_on_untrained_model_returns_nothing() {
		let model = WordModel::new(3, DEFAULT_ALPHA).unwrap();
		assert!(model.predict_next("", 3).is_empty());
	}

	#[test]
	fn empty_context_ranks_by_raw_frequency() {
		let mut model = WordModel::new(3, DEFAULT_ALPHA).unwrap();
		model.train("a a a b");

		let predictions = model.predict_next("", 3);
		assert_eq!(predictions.len(), 2);
		assert_eq!(predictions[0].word, "a");
		assert_eq!(predictions[1].word, "b");
		assert!(predictions[0].probability > predictions[1].probability);
		assert!(close(predictions[0].probability, 0.75));
		assert!(close(predictions[1].probability, 0.25));
	}

	#[test]
	fn matching_orders_accumulate_probability_mass() {
		let mut model = WordModel::new(3, DEFAULT_ALPHA).unwrap();
		model.train("one two three");
		model.train("four two five");

		// Vocabulary: one two three four five
		let vocab = 5.0;
		let trigram = (1.0 + model.alpha) / (1.0 + model.alpha * vocab);
		let bigram = (1.0 + model.alpha) / (2.0 + model.alpha * vocab);

		let predictions = model.predict_next("one two", 3);
		assert_eq!(predictions.len(), 3);
		// "three" is seen after both ("one", "two") and ("two",)
		assert_eq!(predictions[0].word, "three");
		assert!(close(predictions[0].probability, trigram + bigram));
		// "five" only matches the bigram context
		assert_eq!(predictions[1].word, "five");
		assert!(close(predictions[1].probability, bigram));
	}

	#[test]
	fn descent_stops_once_enough_candidates_are_found() {
		let mut model = WordModel::new(3, DEFAULT_ALPHA).unwrap();
		model.train("one two three");
		model.train("four two five");

		let vocab = 5.0;
		let trigram = (1.0 + model.alpha) / (1.0 + model.alpha * vocab);

		// The trigram context alone supplies the single requested
		// candidate, so no bigram mass is accumulated
		let predictions = model.predict_next("one two", 1);
		assert_eq!(predictions.len(), 1);
		assert_eq!(predictions[0].word, "three");
		assert!(close(predictions[0].probability, trigram));
	}

	#[test]
	fn backfill_tops_up_without_duplicates() {
		let mut model = WordModel::new(2, DEFAULT_ALPHA).unwrap();
		model.train("red green");
		model.train("red blue");
		model.train("yellow pink");

		let predictions = model.predict_next("red", 4);
		assert_eq!(predictions.len(), 4);

		// Bigram continuations first (tie broken lexicographically),
		// then frequency-ranked leftovers ("red" was seen twice)
		let words: Vec<&str> = predictions.iter().map(|p| p.word.as_str()).collect();
		assert_eq!(words, vec!["blue", "green", "red", "pink"]);

		// No word appears twice
		let mut unique = words.clone();
		unique.sort();
		unique.dedup();
		assert_eq!(unique.len(), words.len());
	}

	#[test]
	fn long_contexts_are_clamped_to_the_model_order() {
		let mut model = WordModel::new(3, DEFAULT_ALPHA).unwrap();
		model.train("c d e f");

		// Only the trailing two words are relevant for an order-3 model
		let predictions = model.predict_next("a b c d e", 1);
		assert_eq!(predictions.len(), 1);
		assert_eq!(predictions[0].word, "f");
	}

	#[test]
	fn zero_requested_predictions_yield_nothing() {
		let mut model = WordModel::new(3, DEFAULT_ALPHA).unwrap();
		model.train("a b c");
		assert!(model.predict_next("a b", 0).is_empty());
		assert!(model.predict_next("", 0).is_empty());
	}

	#[test]
	fn unknown_contexts_degrade_to_frequency_backfill() {
		let mut model = WordModel::new(3, DEFAULT_ALPHA).unwrap();
		model.train("alpha beta gamma alpha beta");

		let predictions = model.predict_next("delta epsilon", 2);
		assert_eq!(predictions.len(), 2);
		assert_eq!(predictions[0].word, "alpha");
		assert_eq!(predictions[1].word, "beta");
	}

	#[test]
	fn validate_accepts_trained_models() {
		let mut model = WordModel::new(3, DEFAULT_ALPHA).unwrap();
		model.train("the quick brown fox");
		assert!(model.validate().is_ok());
	}

	#[test]
	fn validate_rejects_inconsistent_totals() {
		let mut model = WordModel::new(3, DEFAULT_ALPHA).unwrap();
		model.train("the quick brown fox");
		model.total_words += 1;
		assert!(model.validate().is_err());
	}
}
