use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;

use chargram::{CorpusOptions, CountModel, Encoder, Sampler, WordCorpus};

#[derive(Parser, Debug)]
#[command(about = "A program to sample words from the counting bigram model.")]
struct Args {
    /// A text file containing one word per line
    #[arg(long)]
    data: PathBuf,

    /// Number of words to sample
    #[arg(long, default_value = "5")]
    count: usize,

    /// Random seed for sampling
    #[arg(long, default_value = "1337")]
    seed: u64,

    /// Add-k smoothing applied before row normalization
    #[arg(long, default_value = "0.0")]
    smoothing: f64,

    /// Print pair statistics for the first N words of the corpus
    #[arg(long, default_value = "0")]
    stats: usize,

    /// Skip blank lines in the data file
    #[arg(long)]
    skip_blank_lines: bool,

    /// Drop duplicated words in the data file
    #[arg(long)]
    dedup: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    eprintln!("Loading dataset...");
    let rdr = BufReader::new(File::open(&args.data)?);
    let options = CorpusOptions {
        skip_blank_lines: args.skip_blank_lines,
        dedup_words: args.dedup,
    };
    let corpus = WordCorpus::from_reader_with(rdr, options)?;
    eprintln!(
        "{} words, vocabulary size {}",
        corpus.len(),
        corpus.vocabulary_size()
    );

    let encoder = Encoder::new(corpus.vocabulary())?;
    let model = CountModel::with_smoothing(&corpus, &encoder, args.smoothing)?;
    eprintln!(
        "Dataset mean negative log-likelihood: {:.4}",
        model.mean_log_likelihood(&corpus, &encoder)?
    );

    if args.stats > 0 {
        let end = args.stats.min(corpus.len());
        for word in corpus.get_range(0..end)? {
            for pair in word.get_pairs(1)? {
                let pair = (pair.input[0], pair.label);
                eprintln!(
                    "({}, {}): count={:>8} prob={:.4} nll={:.4}",
                    pair.0,
                    pair.1,
                    model.get_count(&encoder, pair)?,
                    model.get_probability(&encoder, pair)?,
                    model.get_log_likelihood(&encoder, pair)?,
                );
            }
        }
    }

    let mut sampler = Sampler::from_seed(args.seed);
    for _ in 0..args.count {
        println!("{}", model.generate_word(&encoder, &mut sampler)?);
    }

    Ok(())
}
