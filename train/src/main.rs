use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::Parser;

use chargram::{CorpusOptions, Encoder, NeuronModel, Sampler, WordCorpus};

#[derive(Parser, Debug)]
#[command(about = "A program to train the softmax-regression bigram model.")]
struct Args {
    /// A text file containing one word per line
    #[arg(long)]
    data: PathBuf,

    /// Number of gradient-descent iterations
    #[arg(long, default_value = "100")]
    iters: usize,

    /// Gradient-descent step size
    #[arg(long, default_value = "50.0")]
    step_size: f64,

    /// Report the loss every this many iterations (0 disables reports)
    #[arg(long, default_value = "10")]
    report_every: usize,

    /// Number of words to sample after training
    #[arg(long, default_value = "5")]
    count: usize,

    /// Random seed for weight initialization and sampling
    #[arg(long, default_value = "1337")]
    seed: u64,

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
    let mut sampler = Sampler::from_seed(args.seed);
    let mut model = NeuronModel::new(corpus.vocabulary_size(), &mut sampler)?;
    let (inputs, labels) = NeuronModel::prepare_data(corpus.words(), &encoder, 1)?;
    eprintln!("Training on {} pairs", inputs.nrows());

    for iter in 1..=args.iters {
        let (probs, loss) = model.forward_with_loss(inputs.view(), labels.view())?;
        model.reset_grad();
        model.backward(inputs.view(), probs.view(), labels.view())?;
        model.update(args.step_size)?;
        if args.report_every != 0 && iter % args.report_every == 0 {
            eprintln!("iter {iter:>5}: loss {loss:.4}");
        }
    }

    for _ in 0..args.count {
        println!("{}", model.generate_word(&encoder, &mut sampler)?);
    }

    Ok(())
}
