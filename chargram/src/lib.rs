//! # Chargram
//!
//! Chargram trains and samples from two character-level next-character
//! language models over a list of words: a frequency-counting bigram
//! model ([`CountModel`]) and a single-layer softmax-regression bigram
//! model trained by gradient descent ([`NeuronModel`]).
//!
//! ## Examples
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use chargram::{CountModel, Encoder, Sampler, WordCorpus};
//!
//! let f = BufReader::new(File::open("names.txt").unwrap());
//! let corpus = WordCorpus::from_reader(f).unwrap();
//! let encoder = Encoder::new(corpus.vocabulary()).unwrap();
//! let model = CountModel::new(&corpus, &encoder).unwrap();
//!
//! let mut sampler = Sampler::from_seed(1337);
//! for _ in 0..5 {
//!     println!("{}", model.generate_word(&encoder, &mut sampler).unwrap());
//! }
//! ```

mod corpus;
mod count_model;
mod encoder;
pub mod errors;
mod neuron_model;
mod rng;
mod word;

pub use corpus::{CorpusOptions, WordCorpus};
pub use count_model::{CountModel, MAX_GENERATION_STEPS};
pub use encoder::Encoder;
pub use errors::{ChargramError, Result};
pub use neuron_model::NeuronModel;
pub use rng::Sampler;
pub use word::{CharPair, Word, SENTINEL, SENTINEL_INDEX};
