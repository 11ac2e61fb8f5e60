use std::cell::RefCell;
use std::fmt;

use crate::errors::{ChargramError, Result};

/// The reserved symbol marking the start and the end of a word.
pub const SENTINEL: char = '.';

/// The vocabulary index of [`SENTINEL`].
pub const SENTINEL_INDEX: usize = 0;

/// A training pair: a window of consecutive input characters and the
/// character that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharPair {
    /// The input window, in text order.
    pub input: Vec<char>,

    /// The character immediately after the window.
    pub label: char,
}

#[derive(Debug, Clone)]
struct PairCache {
    input_count: usize,
    pairs: Vec<CharPair>,
}

/// One corpus entry, delimited by the sentinel character.
///
/// The canonical form of a word is sentinel + text + sentinel, so
/// `Word::new("ab")` holds the characters `['.', 'a', 'b', '.']`.
///
/// # Examples
///
/// ```
/// use chargram::Word;
///
/// let word = Word::new("ab");
/// assert_eq!("ab", word.text());
/// assert_eq!(4, word.len());
///
/// let pairs = word.get_pairs(1).unwrap();
/// assert_eq!(3, pairs.len());
/// assert_eq!(vec!['.'], pairs[0].input);
/// assert_eq!('a', pairs[0].label);
/// ```
#[derive(Debug, Clone)]
pub struct Word {
    text: String,
    chars: Vec<char>,
    pairs: RefCell<Option<PairCache>>,
}

impl Word {
    /// Creates a new [`Word`] from raw text (without sentinels).
    pub fn new<S>(text: S) -> Self
    where
        S: Into<String>,
    {
        let text = text.into();
        let mut chars = Vec::with_capacity(text.chars().count() + 2);
        chars.push(SENTINEL);
        chars.extend(text.chars());
        chars.push(SENTINEL);
        Self {
            text,
            chars,
            pairs: RefCell::new(None),
        }
    }

    /// Returns the raw text without sentinels.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the canonical length (raw text length plus the two
    /// sentinels).
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always `false`: even an empty text has its two sentinels.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Returns the canonical characters, sentinels included.
    pub fn as_chars(&self) -> &[char] {
        &self.chars
    }

    /// Produces the `(input window, next character)` pairs of this
    /// word, left to right.
    ///
    /// Each window holds `input_count` consecutive canonical
    /// characters, and the label is the character immediately after
    /// it; a word of canonical length N yields `N - input_count`
    /// pairs. The result is memoized for the last requested
    /// `input_count`; a call with a different value recomputes and
    /// replaces the cache.
    ///
    /// # Errors
    ///
    /// [`ChargramError::InvalidArgument`] when `input_count` is zero.
    pub fn get_pairs(&self, input_count: usize) -> Result<Vec<CharPair>> {
        if input_count == 0 {
            return Err(ChargramError::invalid_argument(
                "input_count",
                "must be positive",
            ));
        }
        let mut cache = self.pairs.borrow_mut();
        if let Some(cached) = cache.as_ref() {
            if cached.input_count == input_count {
                return Ok(cached.pairs.clone());
            }
        }
        let pairs = self.compute_pairs(input_count);
        *cache = Some(PairCache {
            input_count,
            pairs: pairs.clone(),
        });
        Ok(pairs)
    }

    fn compute_pairs(&self, input_count: usize) -> Vec<CharPair> {
        let count = self.chars.len().saturating_sub(input_count);
        let mut pairs = Vec::with_capacity(count);
        for start in 0..count {
            pairs.push(CharPair {
                input: self.chars[start..start + input_count].to_vec(),
                label: self.chars[start + input_count],
            });
        }
        pairs
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(input: &[char], label: char) -> CharPair {
        CharPair {
            input: input.to_vec(),
            label,
        }
    }

    #[test]
    fn test_canonical_form() {
        let word = Word::new("ab");

        assert_eq!("ab", word.text());
        assert_eq!(&['.', 'a', 'b', '.'], word.as_chars());
        assert_eq!(".ab.", &word.to_string());
    }

    #[test]
    fn test_empty_text() {
        let word = Word::new("");

        assert_eq!("", word.text());
        assert_eq!(2, word.len());
        assert_eq!(vec![pair(&['.'], '.')], word.get_pairs(1).unwrap());
    }

    #[test]
    fn test_get_pairs_bigram() {
        let word = Word::new("ab");

        assert_eq!(
            vec![pair(&['.'], 'a'), pair(&['a'], 'b'), pair(&['b'], '.')],
            word.get_pairs(1).unwrap()
        );
    }

    #[test]
    fn test_get_pairs_wider_window() {
        let word = Word::new("abc");

        assert_eq!(
            vec![
                pair(&['.', 'a'], 'b'),
                pair(&['a', 'b'], 'c'),
                pair(&['b', 'c'], '.'),
            ],
            word.get_pairs(2).unwrap()
        );
    }

    #[test]
    fn test_get_pairs_window_wider_than_word() {
        let word = Word::new("a");

        assert!(word.get_pairs(3).unwrap().is_empty());
    }

    #[test]
    fn test_get_pairs_zero_window() {
        let word = Word::new("ab");
        let e = word.get_pairs(0);

        assert!(e.is_err());
        assert_eq!(
            "InvalidArgumentError: input_count: must be positive",
            &e.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_get_pairs_recomputes_for_new_window() {
        let word = Word::new("abc");
        let bigram = word.get_pairs(1).unwrap();
        let trigram = word.get_pairs(2).unwrap();
        let bigram_again = word.get_pairs(1).unwrap();

        assert_eq!(4, bigram.len());
        assert_eq!(3, trigram.len());
        assert_eq!(bigram, bigram_again);
    }

    #[test]
    fn test_pair_count_matches_canonical_length() {
        let word = Word::new("hello");
        for input_count in 1..=word.len() {
            let pairs = word.get_pairs(input_count).unwrap();
            assert_eq!(word.len() - input_count, pairs.len());
        }
    }
}
