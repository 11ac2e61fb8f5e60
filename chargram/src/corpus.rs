use std::collections::BTreeSet;
use std::io::BufRead;
use std::ops::Range;
use std::slice;

use hashbrown::HashSet;

use crate::errors::{ChargramError, Result};
use crate::word::{Word, SENTINEL};

/// Options controlling how corpus lines are interpreted.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorpusOptions {
    /// Drop empty lines instead of turning them into empty words.
    pub skip_blank_lines: bool,

    /// Keep only the first occurrence of each word.
    pub dedup_words: bool,
}

/// An ordered collection of [`Word`]s and the vocabulary observed
/// across them.
///
/// The corpus is built eagerly at construction: the line source is
/// read exactly once, every line becomes a [`Word`], and the
/// vocabulary is the sentinel character followed by the distinct raw
/// characters in code-point order.
///
/// # Examples
///
/// ```
/// use chargram::WordCorpus;
///
/// let corpus = WordCorpus::from_lines(["ab", "ba"]).unwrap();
/// assert_eq!(2, corpus.len());
/// assert_eq!(&['.', 'a', 'b'], corpus.vocabulary());
/// assert_eq!("ab", corpus.get(0).unwrap().text());
/// ```
pub struct WordCorpus {
    words: Vec<Word>,
    vocabulary: Vec<char>,
}

impl WordCorpus {
    /// Creates a new [`WordCorpus`] from a buffered reader yielding
    /// one word per line, with default [`CorpusOptions`].
    ///
    /// # Errors
    ///
    /// [`ChargramError::IOError`] when reading fails, and
    /// [`ChargramError::InvalidArgument`] when a line contains the
    /// sentinel character.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: BufRead,
    {
        Self::from_reader_with(rdr, CorpusOptions::default())
    }

    /// Creates a new [`WordCorpus`] from a buffered reader with
    /// explicit [`CorpusOptions`].
    ///
    /// # Errors
    ///
    /// See [`WordCorpus::from_reader`].
    pub fn from_reader_with<R>(rdr: R, options: CorpusOptions) -> Result<Self>
    where
        R: BufRead,
    {
        let mut lines = vec![];
        for line in rdr.lines() {
            lines.push(line?);
        }
        Self::from_lines_with(lines, options)
    }

    /// Creates a new [`WordCorpus`] from an in-memory sequence of
    /// lines, with default [`CorpusOptions`].
    ///
    /// # Errors
    ///
    /// [`ChargramError::InvalidArgument`] when a line contains the
    /// sentinel character.
    pub fn from_lines<I>(lines: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::from_lines_with(lines, CorpusOptions::default())
    }

    /// Creates a new [`WordCorpus`] from an in-memory sequence of
    /// lines with explicit [`CorpusOptions`].
    ///
    /// # Errors
    ///
    /// [`ChargramError::InvalidArgument`] when a line contains the
    /// sentinel character.
    pub fn from_lines_with<I>(lines: I, options: CorpusOptions) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut words = vec![];
        let mut vocab_set = BTreeSet::new();
        let mut seen = HashSet::new();
        for line in lines {
            let line = line.into();
            if options.skip_blank_lines && line.is_empty() {
                continue;
            }
            if line.contains(SENTINEL) {
                return Err(ChargramError::invalid_argument(
                    "lines",
                    format!("word {line:?} contains the sentinel character {SENTINEL:?}"),
                ));
            }
            if options.dedup_words && !seen.insert(line.clone()) {
                continue;
            }
            for c in line.chars() {
                vocab_set.insert(c);
            }
            words.push(Word::new(line));
        }
        let mut vocabulary = Vec::with_capacity(vocab_set.len() + 1);
        vocabulary.push(SENTINEL);
        vocabulary.extend(vocab_set);
        Ok(Self { words, vocabulary })
    }

    /// Returns the number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` when the corpus holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the vocabulary: the sentinel character followed by
    /// every distinct raw character, sorted by code point.
    pub fn vocabulary(&self) -> &[char] {
        &self.vocabulary
    }

    /// Returns the vocabulary size, sentinel included.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Gets the word at a position.
    ///
    /// # Errors
    ///
    /// [`ChargramError::IndexOutOfRange`] when `index` is not in
    /// `[0, len())`.
    pub fn get(&self, index: usize) -> Result<&Word> {
        self.words
            .get(index)
            .ok_or_else(|| ChargramError::index_out_of_range("index", index, self.len()))
    }

    /// Gets the ordered sub-sequence of words covered by `range`.
    ///
    /// # Errors
    ///
    /// [`ChargramError::InvalidArgument`] when the range is reversed
    /// or extends past the end of the corpus.
    pub fn get_range(&self, range: Range<usize>) -> Result<&[Word]> {
        if range.start > range.end || range.end > self.len() {
            return Err(ChargramError::invalid_argument(
                "range",
                format!(
                    "{}..{} is not a valid range for {} words",
                    range.start,
                    range.end,
                    self.len()
                ),
            ));
        }
        Ok(&self.words[range])
    }

    /// Returns all words in corpus order.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Returns an iterator over the words in corpus order.
    pub fn iter(&self) -> slice::Iter<Word> {
        self.words.iter()
    }
}

impl<'a> IntoIterator for &'a WordCorpus {
    type Item = &'a Word;
    type IntoIter = slice::Iter<'a, Word>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lines_order_and_vocabulary() {
        let corpus = WordCorpus::from_lines(["emma", "olivia", "ava"]).unwrap();

        assert_eq!(3, corpus.len());
        assert_eq!("emma", corpus.get(0).unwrap().text());
        assert_eq!("ava", corpus.get(2).unwrap().text());
        assert_eq!(&['.', 'a', 'e', 'i', 'l', 'm', 'o', 'v'], corpus.vocabulary());
        assert_eq!(8, corpus.vocabulary_size());
    }

    #[test]
    fn test_from_reader() {
        let data = "ab\nba\n";
        let corpus = WordCorpus::from_reader(data.as_bytes()).unwrap();

        assert_eq!(2, corpus.len());
        assert_eq!(&['.', 'a', 'b'], corpus.vocabulary());
    }

    #[test]
    fn test_sentinel_in_line() {
        let corpus = WordCorpus::from_lines(["a.b"]);

        assert!(corpus.is_err());
        assert_eq!(
            "InvalidArgumentError: lines: word \"a.b\" contains the sentinel character '.'",
            &corpus.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_blank_lines_kept_by_default() {
        let corpus = WordCorpus::from_lines(["ab", "", "ba"]).unwrap();

        assert_eq!(3, corpus.len());
        assert_eq!("", corpus.get(1).unwrap().text());
    }

    #[test]
    fn test_skip_blank_lines() {
        let options = CorpusOptions {
            skip_blank_lines: true,
            ..CorpusOptions::default()
        };
        let corpus = WordCorpus::from_lines_with(["ab", "", "ba"], options).unwrap();

        assert_eq!(2, corpus.len());
        assert_eq!("ba", corpus.get(1).unwrap().text());
    }

    #[test]
    fn test_dedup_words() {
        let options = CorpusOptions {
            dedup_words: true,
            ..CorpusOptions::default()
        };
        let corpus = WordCorpus::from_lines_with(["ab", "ba", "ab"], options).unwrap();

        assert_eq!(2, corpus.len());
    }

    #[test]
    fn test_duplicates_kept_by_default() {
        let corpus = WordCorpus::from_lines(["ab", "ab"]).unwrap();

        assert_eq!(2, corpus.len());
    }

    #[test]
    fn test_get_out_of_range() {
        let corpus = WordCorpus::from_lines(["ab"]).unwrap();
        let e = corpus.get(1);

        assert!(e.is_err());
        assert_eq!(
            "IndexOutOfRangeError: index: 1 is out of range for size 1",
            &e.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_get_range() {
        let corpus = WordCorpus::from_lines(["a", "b", "c"]).unwrap();
        let words = corpus.get_range(1..3).unwrap();

        assert_eq!(2, words.len());
        assert_eq!("b", words[0].text());
        assert!(corpus.get_range(2..4).is_err());
        assert!(corpus.get_range(0..0).unwrap().is_empty());
    }

    #[test]
    fn test_empty_corpus() {
        let corpus = WordCorpus::from_lines(Vec::<String>::new()).unwrap();

        assert!(corpus.is_empty());
        assert_eq!(&['.'], corpus.vocabulary());
    }

    #[test]
    fn test_iteration_order() {
        let corpus = WordCorpus::from_lines(["a", "b"]).unwrap();
        let texts: Vec<&str> = corpus.iter().map(|w| w.text()).collect();

        assert_eq!(vec!["a", "b"], texts);
    }
}
