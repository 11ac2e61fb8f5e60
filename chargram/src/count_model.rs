use ndarray::{Array2, ArrayView2};

use crate::corpus::WordCorpus;
use crate::encoder::Encoder;
use crate::errors::{ChargramError, Result};
use crate::rng::Sampler;
use crate::word::{SENTINEL, SENTINEL_INDEX};

/// Upper bound on sampling steps for a single generated word.
///
/// Generation terminates almost surely because the sentinel row always
/// has a non-zero sentinel transition on a non-empty corpus; the cap
/// only guards against degenerate inputs.
pub const MAX_GENERATION_STEPS: usize = 4096;

/// The frequency-counting bigram model.
///
/// Holds a `V×V` matrix of observed pair counts and the row-stochastic
/// transition matrix derived from it. Both are built once at
/// construction and immutable afterwards.
///
/// Zero-count rows: a character that never appears as the first
/// element of a pair has an undefined transition distribution. With
/// the default smoothing of 0.0, such a row normalizes to NaN and the
/// log-likelihood of any unobserved pair is `+inf` (unbounded loss);
/// constructing the model through [`CountModel::with_smoothing`] with
/// a positive `alpha` (add-k smoothing) makes every row finite
/// instead.
///
/// # Examples
///
/// ```
/// use chargram::{CountModel, Encoder, Sampler, WordCorpus};
///
/// let corpus = WordCorpus::from_lines(["ab", "ba"]).unwrap();
/// let encoder = Encoder::new(corpus.vocabulary()).unwrap();
/// let model = CountModel::new(&corpus, &encoder).unwrap();
///
/// assert_eq!(1.0, model.get_count(&encoder, ('.', 'a')).unwrap());
///
/// let mut sampler = Sampler::from_seed(1337);
/// let word = model.generate_word(&encoder, &mut sampler).unwrap();
/// assert!(!word.contains('.'));
/// ```
pub struct CountModel {
    counts: Array2<f64>,
    probs: Array2<f64>,
}

impl CountModel {
    /// Builds a model from every `(input, label)` pair of every word
    /// in the corpus, without smoothing.
    ///
    /// # Errors
    ///
    /// [`ChargramError::InvalidArgument`] when the encoder's
    /// vocabulary size differs from the corpus's, and
    /// [`ChargramError::UnknownSymbol`] when a corpus character is
    /// missing from the encoder.
    pub fn new(corpus: &WordCorpus, encoder: &Encoder) -> Result<Self> {
        Self::with_smoothing(corpus, encoder, 0.0)
    }

    /// Builds a model with add-k smoothing: `alpha` is added to every
    /// cell before row normalization, so every transition probability
    /// is positive when `alpha > 0`. Reported counts stay unsmoothed.
    ///
    /// # Errors
    ///
    /// See [`CountModel::new`]; additionally
    /// [`ChargramError::InvalidArgument`] when `alpha` is negative or
    /// not finite.
    pub fn with_smoothing(corpus: &WordCorpus, encoder: &Encoder, alpha: f64) -> Result<Self> {
        if encoder.len() != corpus.vocabulary_size() {
            return Err(ChargramError::invalid_argument(
                "encoder",
                format!(
                    "vocabulary size {} does not match the corpus vocabulary size {}",
                    encoder.len(),
                    corpus.vocabulary_size()
                ),
            ));
        }
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(ChargramError::invalid_argument(
                "alpha",
                "must be finite and non-negative",
            ));
        }
        let size = encoder.len();
        let mut counts = Array2::zeros((size, size));
        for word in corpus {
            for pair in word.get_pairs(1)? {
                let row = encoder.get_index(pair.input[0])?;
                let col = encoder.get_index(pair.label)?;
                counts[[row, col]] += 1.0;
            }
        }
        let mut probs = Array2::zeros((size, size));
        for (count_row, mut prob_row) in counts.outer_iter().zip(probs.outer_iter_mut()) {
            let total = count_row.sum() + alpha * size as f64;
            prob_row.assign(&count_row.mapv(|count| (count + alpha) / total));
        }
        Ok(Self { counts, probs })
    }

    /// Returns the vocabulary size the model was built over.
    pub fn vocab_size(&self) -> usize {
        self.counts.nrows()
    }

    /// Returns the raw count matrix.
    pub fn counts(&self) -> ArrayView2<f64> {
        self.counts.view()
    }

    /// Returns the transition-probability matrix.
    pub fn probs(&self) -> ArrayView2<f64> {
        self.probs.view()
    }

    fn pair_indices(&self, encoder: &Encoder, pair: (char, char)) -> Result<(usize, usize)> {
        if encoder.len() != self.vocab_size() {
            return Err(ChargramError::invalid_argument(
                "encoder",
                format!(
                    "vocabulary size {} does not match the model's vocabulary size {}",
                    encoder.len(),
                    self.vocab_size()
                ),
            ));
        }
        Ok((encoder.get_index(pair.0)?, encoder.get_index(pair.1)?))
    }

    /// Gets the observed count of a character pair.
    ///
    /// # Errors
    ///
    /// [`ChargramError::UnknownSymbol`] when either character is not
    /// in the vocabulary.
    pub fn get_count(&self, encoder: &Encoder, pair: (char, char)) -> Result<f64> {
        let (row, col) = self.pair_indices(encoder, pair)?;
        Ok(self.counts[[row, col]])
    }

    /// Gets the transition probability of a character pair.
    ///
    /// # Errors
    ///
    /// [`ChargramError::UnknownSymbol`] when either character is not
    /// in the vocabulary.
    pub fn get_probability(&self, encoder: &Encoder, pair: (char, char)) -> Result<f64> {
        let (row, col) = self.pair_indices(encoder, pair)?;
        Ok(self.probs[[row, col]])
    }

    /// Gets the negative log-likelihood `-ln p` of a character pair.
    /// An unobserved pair in an unsmoothed model yields `+inf`.
    ///
    /// # Errors
    ///
    /// [`ChargramError::UnknownSymbol`] when either character is not
    /// in the vocabulary.
    pub fn get_log_likelihood(&self, encoder: &Encoder, pair: (char, char)) -> Result<f64> {
        Ok(-self.get_probability(encoder, pair)?.ln())
    }

    /// Computes the mean negative log-likelihood over every pair of
    /// every word in the corpus. This is the dataset loss the neural
    /// model's training is compared against.
    ///
    /// # Errors
    ///
    /// [`ChargramError::InvalidArgument`] when the corpus yields no
    /// pairs.
    pub fn mean_log_likelihood(&self, corpus: &WordCorpus, encoder: &Encoder) -> Result<f64> {
        let mut log_sum = 0.0;
        let mut count = 0usize;
        for word in corpus {
            for pair in word.get_pairs(1)? {
                log_sum += self.get_log_likelihood(encoder, (pair.input[0], pair.label))?;
                count += 1;
            }
        }
        if count == 0 {
            return Err(ChargramError::invalid_argument(
                "corpus",
                "yields no pairs",
            ));
        }
        Ok(log_sum / count as f64)
    }

    /// Draws the index following `index` from the model's transition
    /// distribution.
    ///
    /// # Errors
    ///
    /// [`ChargramError::IndexOutOfRange`] when `index` is not in
    /// `[0, vocab_size())`, and [`ChargramError::InvalidArgument`]
    /// when the row's distribution is degenerate (a zero-count row in
    /// an unsmoothed model).
    pub fn sample_next(&self, index: usize, sampler: &mut Sampler) -> Result<usize> {
        if index >= self.vocab_size() {
            return Err(ChargramError::index_out_of_range(
                "index",
                index,
                self.vocab_size(),
            ));
        }
        sampler.multinomial(self.probs.row(index))
    }

    /// Generates one word by walking the transition matrix from the
    /// sentinel until the sentinel is drawn again. The returned string
    /// never contains the sentinel.
    ///
    /// # Errors
    ///
    /// [`ChargramError::PreconditionViolated`] when no sentinel is
    /// drawn within [`MAX_GENERATION_STEPS`], and the errors of
    /// [`CountModel::sample_next`].
    pub fn generate_word(&self, encoder: &Encoder, sampler: &mut Sampler) -> Result<String> {
        let mut index = encoder.get_index(SENTINEL)?;
        let mut chars = String::new();
        for _ in 0..MAX_GENERATION_STEPS {
            index = self.sample_next(index, sampler)?;
            if index == SENTINEL_INDEX {
                return Ok(chars);
            }
            chars.push(encoder.get_char(index)?);
        }
        Err(ChargramError::precondition_violated(format!(
            "no end sentinel sampled within {MAX_GENERATION_STEPS} steps"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_word_model() -> (WordCorpus, Encoder, CountModel) {
        let corpus = WordCorpus::from_lines(["ab", "ba"]).unwrap();
        let encoder = Encoder::new(corpus.vocabulary()).unwrap();
        let model = CountModel::new(&corpus, &encoder).unwrap();
        (corpus, encoder, model)
    }

    #[test]
    fn test_counts_for_two_word_corpus() {
        let (_, encoder, model) = two_word_model();

        // Pairs: ('.','a'), ('a','b'), ('b','.'), ('.','b'), ('b','a'), ('a','.').
        assert_eq!(1.0, model.get_count(&encoder, ('.', 'a')).unwrap());
        assert_eq!(1.0, model.get_count(&encoder, ('a', 'b')).unwrap());
        assert_eq!(1.0, model.get_count(&encoder, ('b', '.')).unwrap());
        assert_eq!(0.0, model.get_count(&encoder, ('a', 'a')).unwrap());
    }

    #[test]
    fn test_probability_is_count_over_row_total() {
        let (_, encoder, model) = two_word_model();

        // Row '.': counts 0/1/1 over a total of 2.
        assert!((model.get_probability(&encoder, ('.', 'a')).unwrap() - 0.5).abs() < 1e-12);
        assert!((model.get_probability(&encoder, ('.', 'b')).unwrap() - 0.5).abs() < 1e-12);
        assert!((model.get_probability(&encoder, ('.', '.')).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_stochastic() {
        let corpus = WordCorpus::from_lines(["emma", "olivia", "ava"]).unwrap();
        let encoder = Encoder::new(corpus.vocabulary()).unwrap();
        let model = CountModel::new(&corpus, &encoder).unwrap();

        for (row, count_row) in model.probs().outer_iter().zip(model.counts().outer_iter()) {
            if count_row.sum() > 0.0 {
                assert!((row.sum() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_smoothed_rows_are_stochastic_everywhere() {
        let corpus = WordCorpus::from_lines(["ab"]).unwrap();
        let encoder = Encoder::new(corpus.vocabulary()).unwrap();
        let model = CountModel::with_smoothing(&corpus, &encoder, 1.0).unwrap();

        for row in model.probs().outer_iter() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
            assert!(row.iter().all(|&p| p > 0.0));
        }
        // Counts stay unsmoothed.
        assert_eq!(0.0, model.get_count(&encoder, ('a', 'a')).unwrap());
    }

    #[test]
    fn test_unobserved_pair_has_unbounded_loss() {
        let (_, encoder, model) = two_word_model();

        let nll = model.get_log_likelihood(&encoder, ('a', 'a')).unwrap();
        assert!(nll.is_infinite() && nll > 0.0);
    }

    #[test]
    fn test_zero_count_row_without_smoothing() {
        // An empty corpus leaves even the sentinel row unobserved.
        let corpus = WordCorpus::from_lines(Vec::<String>::new()).unwrap();
        let encoder = Encoder::new(corpus.vocabulary()).unwrap();
        let model = CountModel::new(&corpus, &encoder).unwrap();

        assert!(model.get_probability(&encoder, ('.', '.')).unwrap().is_nan());
        let mut sampler = Sampler::from_seed(0);
        assert!(model.sample_next(0, &mut sampler).is_err());
    }

    #[test]
    fn test_unknown_symbol() {
        let (_, encoder, model) = two_word_model();
        let e = model.get_count(&encoder, ('z', 'a'));

        assert!(e.is_err());
        assert_eq!(
            "UnknownSymbolError: 'z' is not in the vocabulary",
            &e.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_negative_smoothing() {
        let corpus = WordCorpus::from_lines(["ab"]).unwrap();
        let encoder = Encoder::new(corpus.vocabulary()).unwrap();
        let e = CountModel::with_smoothing(&corpus, &encoder, -1.0);

        assert!(e.is_err());
        assert_eq!(
            "InvalidArgumentError: alpha: must be finite and non-negative",
            &e.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_mismatched_encoder() {
        let corpus = WordCorpus::from_lines(["ab"]).unwrap();
        let encoder = Encoder::new(&['.', 'a', 'b', 'c']).unwrap();
        let e = CountModel::new(&corpus, &encoder);

        assert!(e.is_err());
    }

    #[test]
    fn test_sample_next_out_of_range() {
        let (_, _, model) = two_word_model();
        let mut sampler = Sampler::from_seed(0);
        let e = model.sample_next(3, &mut sampler);

        assert!(e.is_err());
        assert_eq!(
            "IndexOutOfRangeError: index: 3 is out of range for size 3",
            &e.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_sample_next_deterministic() {
        let (_, _, model) = two_word_model();
        let mut a = Sampler::from_seed(1337);
        let mut b = Sampler::from_seed(1337);
        for _ in 0..50 {
            assert_eq!(
                model.sample_next(0, &mut a).unwrap(),
                model.sample_next(0, &mut b).unwrap()
            );
        }
    }

    #[test]
    fn test_generate_word_deterministic_and_sentinel_free() {
        let corpus = WordCorpus::from_lines(["emma", "olivia", "ava", "isabella"]).unwrap();
        let encoder = Encoder::new(corpus.vocabulary()).unwrap();
        let model = CountModel::new(&corpus, &encoder).unwrap();

        let mut a = Sampler::from_seed(1337);
        let mut b = Sampler::from_seed(1337);
        for _ in 0..20 {
            let word_a = model.generate_word(&encoder, &mut a).unwrap();
            let word_b = model.generate_word(&encoder, &mut b).unwrap();
            assert_eq!(word_a, word_b);
            assert!(!word_a.contains(SENTINEL));
        }
    }

    #[test]
    fn test_mean_log_likelihood() {
        let (corpus, encoder, model) = two_word_model();
        let loss = model.mean_log_likelihood(&corpus, &encoder).unwrap();

        // Every row is uniform over two observed successors, so every
        // pair has probability 0.5.
        assert!((loss - 0.5f64.ln().abs()).abs() < 1e-9);
    }

    #[test]
    fn test_mean_log_likelihood_empty_corpus() {
        let corpus = WordCorpus::from_lines(Vec::<String>::new()).unwrap();
        let encoder = Encoder::new(corpus.vocabulary()).unwrap();
        let model = CountModel::new(&corpus, &encoder).unwrap();
        let e = model.mean_log_likelihood(&corpus, &encoder);

        assert!(e.is_err());
    }
}
