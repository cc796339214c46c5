use std::path::PathBuf;

use argh::FromArgs;
use imlab::{degrade, params::DegradeParams, CancellationToken};

/// Writes noisy, blurred, low contrast, dark and overexposed variants of every image
/// of a directory
#[derive(FromArgs)]
struct Args {
    /// directory with the input images
    #[argh(option, short = 'i')]
    input_dir: PathBuf,

    /// directory to write the degraded images to
    #[argh(option, short = 'o')]
    output_dir: PathBuf,

    /// json file with the degradation parameters
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// seed of the noise generator
    #[argh(option, short = 's')]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut params = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => DegradeParams::default(),
    };
    if args.seed.is_some() {
        params.seed = args.seed;
    }

    // create a cancel token to stop the batch between two files
    let cancel_token = CancellationToken::new();

    ctrlc::set_handler({
        let cancel_token = cancel_token.clone();
        move || {
            println!("Received Ctrl-C signal. Stopping after the current image !!");
            cancel_token.cancel();
        }
    })?;

    let report = degrade::run_batch(&args.input_dir, &args.output_dir, &params, &cancel_token)?;

    for outcome in &report.outcomes {
        if let degrade::FileOutcome::Failed { input, error } = outcome {
            println!("failed {}: {error}", input.display());
        }
    }

    println!(
        "{} processed, {} failed{}",
        report.num_processed(),
        report.num_failed(),
        if report.cancelled { ", cancelled" } else { "" }
    );

    Ok(())
}
