use ndarray::{Array2, ArrayView2, Axis};

use crate::count_model::MAX_GENERATION_STEPS;
use crate::encoder::{argmax, Encoder};
use crate::errors::{ChargramError, Result};
use crate::rng::Sampler;
use crate::word::{Word, SENTINEL_INDEX};

/// Applies a numerically stable softmax to every row: each row is
/// shifted by its maximum before exponentiation, then normalized.
fn softmax_rows(mut logits: Array2<f64>) -> Array2<f64> {
    for mut row in logits.outer_iter_mut() {
        let max = row.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        row.mapv_inplace(|x| (x - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|x| x / sum);
    }
    logits
}

/// The single-layer softmax-regression bigram model.
///
/// One trainable `V×V` weight matrix, no bias and no non-linearity:
/// `probs = softmax(inputs · W)` row-wise. Training follows an
/// explicit three-phase protocol, mirroring manual gradient descent:
///
/// 1. [`NeuronModel::forward_with_loss`] computes probabilities and
///    the mean cross-entropy loss;
/// 2. [`NeuronModel::reset_grad`] then [`NeuronModel::backward`]
///    populate the gradient (backward accumulates across calls, so a
///    reset is required before each fresh pass);
/// 3. [`NeuronModel::update`] applies one gradient-descent step.
///
/// The gradient is the closed form of softmax regression with mean
/// cross-entropy loss, `inputsᵀ · (probs − labels) / batch`, which is
/// numerically equivalent to differentiating the forward graph.
pub struct NeuronModel {
    weights: Array2<f64>,
    grad: Option<Array2<f64>>,
}

impl NeuronModel {
    /// Creates a model with weights drawn from N(0, 1) using the
    /// supplied sampler.
    ///
    /// # Errors
    ///
    /// [`ChargramError::InvalidArgument`] when `vocab_size` is zero.
    pub fn new(vocab_size: usize, sampler: &mut Sampler) -> Result<Self> {
        if vocab_size == 0 {
            return Err(ChargramError::invalid_argument(
                "vocab_size",
                "must be positive",
            ));
        }
        let weights = Array2::from_shape_fn((vocab_size, vocab_size), |_| {
            sampler.standard_normal()
        });
        Ok(Self {
            weights,
            grad: None,
        })
    }

    /// Returns the vocabulary size the model was built over.
    pub fn vocab_size(&self) -> usize {
        self.weights.nrows()
    }

    /// Returns the current weight matrix.
    pub fn weights(&self) -> ArrayView2<f64> {
        self.weights.view()
    }

    fn check_input_shape(&self, inputs: &ArrayView2<f64>) -> Result<()> {
        if inputs.ncols() != self.vocab_size() {
            return Err(ChargramError::shape_mismatch(format!(
                "input width {} does not match vocabulary size {}",
                inputs.ncols(),
                self.vocab_size()
            )));
        }
        Ok(())
    }

    fn check_label_shape(
        &self,
        inputs: &ArrayView2<f64>,
        labels: &ArrayView2<f64>,
    ) -> Result<()> {
        if labels.nrows() != inputs.nrows() {
            return Err(ChargramError::shape_mismatch(format!(
                "label batch {} does not match input batch {}",
                labels.nrows(),
                inputs.nrows()
            )));
        }
        if labels.ncols() != self.vocab_size() {
            return Err(ChargramError::shape_mismatch(format!(
                "label width {} does not match vocabulary size {}",
                labels.ncols(),
                self.vocab_size()
            )));
        }
        Ok(())
    }

    /// Computes the forward pass: `softmax(inputs · W)` row-wise.
    /// `inputs` is a batch of one-hot rows of width V.
    ///
    /// # Errors
    ///
    /// [`ChargramError::ShapeMismatch`] when the input width differs
    /// from the vocabulary size.
    pub fn forward(&self, inputs: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.check_input_shape(&inputs)?;
        Ok(softmax_rows(inputs.dot(&self.weights)))
    }

    /// Computes the forward pass and the mean negative log-likelihood
    /// of the labeled class per row.
    ///
    /// # Errors
    ///
    /// [`ChargramError::ShapeMismatch`] when widths or batch sizes
    /// disagree, and [`ChargramError::InvalidArgument`] on an empty
    /// batch.
    pub fn forward_with_loss(
        &self,
        inputs: ArrayView2<f64>,
        labels: ArrayView2<f64>,
    ) -> Result<(Array2<f64>, f64)> {
        self.check_label_shape(&inputs, &labels)?;
        if inputs.nrows() == 0 {
            return Err(ChargramError::invalid_argument(
                "inputs",
                "batch must not be empty",
            ));
        }
        let probs = self.forward(inputs)?;
        let mut log_sum = 0.0;
        for (prob_row, label_row) in probs.outer_iter().zip(labels.outer_iter()) {
            log_sum -= prob_row[argmax(label_row)].ln();
        }
        let loss = log_sum / probs.nrows() as f64;
        Ok((probs, loss))
    }

    /// Clears the accumulated gradient. Must be called before a fresh
    /// backward pass; [`NeuronModel::backward`] otherwise accumulates
    /// across calls.
    pub fn reset_grad(&mut self) {
        self.grad = None;
    }

    /// Accumulates `∂loss/∂weights` for one forward computation into
    /// the gradient slot, using the closed form
    /// `inputsᵀ · (probs − labels) / batch`.
    ///
    /// # Errors
    ///
    /// [`ChargramError::ShapeMismatch`] when any of the three
    /// matrices disagree in batch or width, and
    /// [`ChargramError::InvalidArgument`] on an empty batch.
    pub fn backward(
        &mut self,
        inputs: ArrayView2<f64>,
        probs: ArrayView2<f64>,
        labels: ArrayView2<f64>,
    ) -> Result<()> {
        self.check_input_shape(&inputs)?;
        self.check_label_shape(&inputs, &probs)?;
        self.check_label_shape(&inputs, &labels)?;
        if inputs.nrows() == 0 {
            return Err(ChargramError::invalid_argument(
                "inputs",
                "batch must not be empty",
            ));
        }
        let mut delta = probs.to_owned();
        delta -= &labels;
        let grad = inputs.t().dot(&delta) / inputs.nrows() as f64;
        match self.grad.as_mut() {
            Some(accumulated) => *accumulated += &grad,
            None => self.grad = Some(grad),
        }
        Ok(())
    }

    /// Applies one gradient-descent step:
    /// `weights -= step_size * grad`.
    ///
    /// # Errors
    ///
    /// [`ChargramError::PreconditionViolated`] when no backward pass
    /// has populated the gradient since the last reset.
    pub fn update(&mut self, step_size: f64) -> Result<()> {
        let grad = self.grad.as_ref().ok_or_else(|| {
            ChargramError::precondition_violated(
                "update requested before any backward pass populated the gradient",
            )
        })?;
        self.weights.scaled_add(-step_size, grad);
        Ok(())
    }

    /// Generates one word by repeatedly running the forward pass on
    /// the current character's one-hot embedding and sampling the next
    /// index from the resulting distribution, until the sentinel is
    /// drawn. The returned string never contains the sentinel.
    ///
    /// # Errors
    ///
    /// [`ChargramError::InvalidArgument`] when the encoder's
    /// vocabulary size differs from the model's, and
    /// [`ChargramError::PreconditionViolated`] when no sentinel is
    /// drawn within [`MAX_GENERATION_STEPS`].
    pub fn generate_word(&self, encoder: &Encoder, sampler: &mut Sampler) -> Result<String> {
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
        let mut index = SENTINEL_INDEX;
        let mut chars = String::new();
        for _ in 0..MAX_GENERATION_STEPS {
            let input = encoder.get_embedding(index)?.insert_axis(Axis(0));
            let probs = self.forward(input)?;
            index = sampler.multinomial(probs.row(0))?;
            if index == SENTINEL_INDEX {
                return Ok(chars);
            }
            chars.push(encoder.get_char(index)?);
        }
        Err(ChargramError::precondition_violated(format!(
            "no end sentinel sampled within {MAX_GENERATION_STEPS} steps"
        )))
    }

    /// Builds the parallel one-hot training batches for a sequence of
    /// words: one input row and one label row per
    /// `(input window, label)` pair, in pair order across words.
    /// Windows of `input_count` characters concatenate their one-hot
    /// embeddings horizontally, so the input batch has width
    /// `input_count * V` and the label batch width V.
    ///
    /// # Errors
    ///
    /// [`ChargramError::InvalidArgument`] when `input_count` is zero,
    /// and [`ChargramError::UnknownSymbol`] when a word contains a
    /// character the encoder does not know.
    pub fn prepare_data(
        words: &[Word],
        encoder: &Encoder,
        input_count: usize,
    ) -> Result<(Array2<f64>, Array2<f64>)> {
        let size = encoder.len();
        let mut input_data = vec![];
        let mut label_data = vec![];
        let mut rows = 0;
        for word in words {
            for pair in word.get_pairs(input_count)? {
                for &c in &pair.input {
                    input_data.extend(encoder.get_embedding_for_char(c)?.iter());
                }
                label_data.extend(encoder.get_embedding_for_char(pair.label)?.iter());
                rows += 1;
            }
        }
        let inputs = Array2::from_shape_vec((rows, input_count * size), input_data)
            .map_err(|e| ChargramError::shape_mismatch(e.to_string()))?;
        let labels = Array2::from_shape_vec((rows, size), label_data)
            .map_err(|e| ChargramError::shape_mismatch(e.to_string()))?;
        Ok((inputs, labels))
    }
}
