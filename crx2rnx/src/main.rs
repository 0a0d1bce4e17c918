//! Command line tool to decompress CRINEX files
mod cli;

use cli::Cli;
use crinex::prelude::{decompress_file, Config, Summary};

use env_logger::{Builder, Target};
use log::{error, info, warn};
use thiserror::Error;

use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread,
};

#[derive(Debug, Error)]
enum Error {
    #[error("{0} file(s) could not be decompressed")]
    Failures(usize),
    #[error("custom output (-o) requires a single input file")]
    AmbiguousOutput,
    #[error("decompression worker panicked")]
    WorkerPanic,
}

/// Outcome of one file
struct Report {
    input: PathBuf,
    result: Result<(PathBuf, Summary), crinex::Error>,
}

fn decompress_one(input: &Path, output: Option<&Path>, config: Config, delete: bool) -> Report {
    let result = decompress_file(input, output, config);
    if delete && result.is_ok() {
        if let Err(e) = std::fs::remove_file(input) {
            warn!("failed to delete \"{}\": {}", input.display(), e);
        }
    }
    Report {
        input: input.to_path_buf(),
        result,
    }
}

/// Decompresses all inputs with a pool of `jobs` workers.
/// Reports are returned in order of completion.
fn decompress_all(
    inputs: Vec<PathBuf>,
    config: &Config,
    jobs: usize,
    delete: bool,
) -> Result<Vec<Report>, Error> {
    let total = inputs.len();
    let (job_tx, job_rx) = mpsc::channel::<PathBuf>();
    let (report_tx, report_rx) = mpsc::channel::<Report>();
    let job_rx = Arc::new(Mutex::new(job_rx));

    for input in inputs {
        // cannot fail: job_rx is still owned here
        let _ = job_tx.send(input);
    }
    drop(job_tx);

    let mut workers = Vec::with_capacity(jobs);
    for _ in 0..jobs.min(total) {
        let job_rx = Arc::clone(&job_rx);
        let report_tx = report_tx.clone();
        let config = config.clone();
        workers.push(thread::spawn(move || loop {
            let input = match job_rx.lock() {
                Ok(job_rx) => job_rx.recv(),
                Err(_) => return,
            };
            let Ok(input) = input else {
                return;
            };
            let report = decompress_one(&input, None, config.clone(), delete);
            if report_tx.send(report).is_err() {
                return;
            }
        }));
    }
    drop(report_tx);

    let reports = report_rx.iter().collect::<Vec<_>>();
    for worker in workers {
        worker.join().map_err(|_| Error::WorkerPanic)?;
    }
    Ok(reports)
}

fn main() -> Result<(), Error> {
    let mut builder = Builder::from_default_env();
    builder
        .target(Target::Stdout)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    let cli = Cli::new();
    let config = cli.config();
    let inputs = cli
        .input_paths()
        .into_iter()
        .map(|path| path.to_path_buf())
        .collect::<Vec<_>>();

    let reports = match cli.output_path() {
        Some(output) => {
            if inputs.len() != 1 {
                return Err(Error::AmbiguousOutput);
            }
            vec![decompress_one(&inputs[0], Some(output), config, cli.delete())]
        },
        None => decompress_all(inputs, &config, cli.jobs(), cli.delete())?,
    };

    let mut failures = 0;
    for report in reports {
        match report.result {
            Ok((output, summary)) => {
                info!(
                    "\"{}\" generated: {} epochs, {} events, {} satellites",
                    output.display(),
                    summary.epochs,
                    summary.events,
                    summary.satellites.len()
                );
                if summary.dropped > 0 {
                    warn!(
                        "\"{}\": {} corrupt epoch(s) dropped, {} line(s) skipped",
                        report.input.display(),
                        summary.dropped,
                        summary.skipped
                    );
                }
            },
            Err(e) => {
                error!("\"{}\": {}", report.input.display(), e);
                failures += 1;
            },
        }
    }

    if failures > 0 {
        Err(Error::Failures(failures))
    } else {
        Ok(())
    }
}
