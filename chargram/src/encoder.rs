use hashbrown::HashMap;
use ndarray::{Array2, ArrayView1};

use crate::errors::{ChargramError, Result};

/// Returns the position of the largest value in `row`, preferring the
/// earliest position on ties.
pub(crate) fn argmax(row: ArrayView1<f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &value) in row.iter().enumerate() {
        if value > best_value {
            best = i;
            best_value = value;
        }
    }
    best
}

/// A bijective mapping between vocabulary characters and dense indices,
/// plus a one-hot embedding table for the neural model.
///
/// The encoder is immutable after construction: the character order of
/// the vocabulary it was built from fixes the index of every symbol.
///
/// # Examples
///
/// ```
/// use chargram::Encoder;
///
/// let encoder = Encoder::new(&['.', 'a', 'b']).unwrap();
/// assert_eq!(1, encoder.get_index('a').unwrap());
/// assert_eq!('b', encoder.get_char(2).unwrap());
/// ```
pub struct Encoder {
    char_lookup: Vec<char>,
    char_map: HashMap<char, usize>,
    embeddings: Array2<f64>,
}

impl Encoder {
    /// Creates a new [`Encoder`] over an ordered vocabulary.
    ///
    /// # Errors
    ///
    /// [`ChargramError::InvalidArgument`] when the vocabulary is empty
    /// or contains a duplicated character.
    pub fn new(vocabulary: &[char]) -> Result<Self> {
        if vocabulary.is_empty() {
            return Err(ChargramError::invalid_argument(
                "vocabulary",
                "must not be empty",
            ));
        }
        let mut char_map = HashMap::with_capacity(vocabulary.len());
        for (index, &c) in vocabulary.iter().enumerate() {
            if char_map.insert(c, index).is_some() {
                return Err(ChargramError::invalid_argument(
                    "vocabulary",
                    format!("contains duplicated character {c:?}"),
                ));
            }
        }
        Ok(Self {
            char_lookup: vocabulary.to_vec(),
            char_map,
            embeddings: Array2::eye(vocabulary.len()),
        })
    }

    /// Returns the vocabulary size.
    pub fn len(&self) -> usize {
        self.char_lookup.len()
    }

    /// Returns `true` when the vocabulary is empty. Construction
    /// rejects empty vocabularies, so this is always `false`.
    pub fn is_empty(&self) -> bool {
        self.char_lookup.is_empty()
    }

    /// Gets the vocabulary index of a character.
    ///
    /// # Errors
    ///
    /// [`ChargramError::UnknownSymbol`] when `c` was never registered.
    pub fn get_index(&self, c: char) -> Result<usize> {
        self.char_map
            .get(&c)
            .copied()
            .ok_or_else(|| ChargramError::unknown_symbol(c))
    }

    /// Gets the vocabulary indices of a sequence of characters, in
    /// order.
    ///
    /// # Errors
    ///
    /// [`ChargramError::UnknownSymbol`] on the first unregistered
    /// character.
    pub fn get_index_many(&self, chars: &[char]) -> Result<Vec<usize>> {
        chars.iter().map(|&c| self.get_index(c)).collect()
    }

    /// Gets the character at a vocabulary index.
    ///
    /// # Errors
    ///
    /// [`ChargramError::IndexOutOfRange`] when `index` is not in
    /// `[0, len())`.
    pub fn get_char(&self, index: usize) -> Result<char> {
        self.char_lookup
            .get(index)
            .copied()
            .ok_or_else(|| ChargramError::index_out_of_range("index", index, self.len()))
    }

    /// Gets the one-hot embedding row for a vocabulary index: 1.0 at
    /// `index`, 0.0 elsewhere.
    ///
    /// # Errors
    ///
    /// [`ChargramError::IndexOutOfRange`] when `index` is not in
    /// `[0, len())`.
    pub fn get_embedding(&self, index: usize) -> Result<ArrayView1<f64>> {
        if index >= self.len() {
            return Err(ChargramError::index_out_of_range("index", index, self.len()));
        }
        Ok(self.embeddings.row(index))
    }

    /// Gets the one-hot embedding row for a character.
    ///
    /// # Errors
    ///
    /// [`ChargramError::UnknownSymbol`] when `c` was never registered.
    pub fn get_embedding_for_char(&self, c: char) -> Result<ArrayView1<f64>> {
        self.get_embedding(self.get_index(c)?)
    }

    /// Gets the character whose index holds the largest value of
    /// `embedding` (the inverse of [`Encoder::get_embedding`] for
    /// one-hot rows).
    ///
    /// # Errors
    ///
    /// [`ChargramError::PreconditionViolated`] when the length of
    /// `embedding` differs from the vocabulary size.
    pub fn get_char_from_embedding(&self, embedding: ArrayView1<f64>) -> Result<char> {
        if embedding.len() != self.len() {
            return Err(ChargramError::precondition_violated(format!(
                "embedding length {} does not match vocabulary size {}",
                embedding.len(),
                self.len()
            )));
        }
        self.get_char(argmax(embedding))
    }
}
