/// Normalizes raw text into a sequence of word tokens.
///
/// # Behavior
/// - Lowercases the input.
/// - Replaces every character that is not a letter, a digit, an
///   underscore or an apostrophe with a space.
/// - Splits on runs of whitespace and drops empty fragments.
///
/// # Notes
/// - Pure and deterministic, no side effects.
/// - Empty or punctuation-only input yields an empty vector.
/// - UTF-8 safe: iterates over characters, not bytes.
pub fn tokenize(text: &str) -> Vec<String> {
	let normalized: String = text
		.chars()
		.flat_map(char::to_lowercase)
		.map(|c| {
			if c.is_alphanumeric() || c == '_' || c == '\'' || c.is_whitespace() {
				c
			} else {
				' '
			}
		})
		.collect();

	normalized.split_whitespace().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lowercases_strips_punctuation_and_splits() {
		assert_eq!(
			tokenize("Hello, World!  it's  HERE"),
			vec!["hello", "world", "it's", "here"]
		);
	}

	#[test]
	fn keeps_digits_and_underscores() {
		assert_eq!(tokenize("route_66 is 42km"), vec!["route_66", "is", "42km"]);
	}

	#[test]
	fn empty_input_yields_no_tokens() {
		assert!(tokenize("").is_empty());
		assert!(tokenize("   \t\n ").is_empty());
		assert!(tokenize("?!... --- ;;;").is_empty());
	}

	#[test]
	fn punctuation_becomes_a_word_boundary() {
		assert_eq!(tokenize("end.start"), vec!["end", "start"]);
		assert_eq!(tokenize("semi;colon"), vec!["semi", "colon"]);
	}

	#[test]
	fn never_produces_empty_tokens() {
		for token in tokenize("  ...a,,b!!  c  ") {
			assert!(!token.is_empty());
		}
	}
}
