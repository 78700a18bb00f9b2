//! Blur Recall CLI
//!
//! Plays one session in the terminal. Each attempt writes the blurred
//! image to the output directory as `current.png`; guesses are read from
//! standard input.

use blur_recall::{
    aggregate::{JsonReportWriter, Renderer, TimingReport},
    config::FileConfig,
    game::{
        GameController, GameError, GameService, GuessOutcome, InMemorySessionStore, RoundView,
        SessionId,
    },
    imaging::{DirectorySource, ImageSource, SyntheticSource},
    ledger::{CsvLedger, Ledger},
    metrics::GameMetrics,
};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "blur-recall", version, about = "Guess the image before the blur clears")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory containing the puzzle images
    #[arg(long)]
    images: Option<PathBuf>,
    /// CSV ledger of completed rounds
    #[arg(long)]
    ledger: Option<PathBuf>,
    /// Directory for blurred frames and the timing report
    #[arg(long)]
    output: Option<PathBuf>,
    /// Use generated images instead of loading files
    #[arg(long)]
    synthetic: bool,
    /// Serve Prometheus metrics on this port
    #[cfg(feature = "metrics")]
    #[arg(long)]
    metrics_port: Option<u16>,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    info!("Blur Recall v{}", blur_recall::VERSION);

    if let Err(e) = ctrlc::set_handler(|| {
        warn!("Interrupted, session abandoned");
        std::process::exit(130);
    }) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    if let Some(images) = args.images {
        file_config.paths.images_dir = images;
    }
    if let Some(ledger) = args.ledger {
        file_config.paths.ledger = ledger;
    }
    if let Some(output) = args.output {
        file_config.paths.output_dir = output;
    }

    let game_config = file_config.game_config()?;
    let paths = file_config.paths;

    let source: Arc<dyn ImageSource> = if args.synthetic {
        Arc::new(SyntheticSource::with_dimensions(256, 256))
    } else {
        Arc::new(DirectorySource::new(&paths.images_dir))
    };
    let ledger: Arc<dyn Ledger> = Arc::new(CsvLedger::new(&paths.ledger));
    let metrics = Arc::new(GameMetrics::new()?);

    #[cfg(feature = "metrics")]
    if let Some(port) = args.metrics_port {
        spawn_metrics_server(port, Arc::clone(&metrics), Arc::clone(&ledger));
    }

    let controller =
        GameController::new(game_config, source, Arc::clone(&ledger)).with_metrics(metrics);
    let service = GameService::new(controller, Arc::new(InMemorySessionStore::new()));

    std::fs::create_dir_all(&paths.output_dir)?;
    let frame_path = paths.output_dir.join("current.png");

    let session = service.start_session()?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let prompt = match service.begin_round(&session)? {
            RoundView::Playing(prompt) => prompt,
            RoundView::SessionComplete => break,
        };

        prompt.image.save(&frame_path)?;
        println!(
            "Image {}/{}, attempt {}/{} (blur {}): see {}",
            prompt.round,
            prompt.total_rounds,
            prompt.attempt,
            prompt.max_attempts,
            prompt.blur_level,
            frame_path.display()
        );
        print!("Your guess: ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            warn!("Input closed, session abandoned");
            return Ok(());
        };
        let guess = line?;

        let Some(outcome) = submit_or_keep(&service, &session, &guess)? else {
            println!("Could not save your answer. Please try again.");
            continue;
        };
        match outcome {
            GuessOutcome::Resolved { entry, .. } if entry.is_solved() => {
                println!("Correct! {} points ({})", entry.score, entry.interpretation);
            }
            GuessOutcome::Resolved { entry, .. } => {
                println!("Out of attempts for {}. {}", entry.image, entry.interpretation);
            }
            GuessOutcome::TryAgain { attempts_left, .. } => {
                println!("Not quite. {} attempts left.", attempts_left);
            }
        }
    }

    let summary = service.finalize_session(&session)?;
    service.end_session(&session);

    println!();
    println!(
        "Average score: {:.1} ({})",
        summary.average_score, summary.interpretation
    );
    print_report(&summary.report);

    JsonReportWriter::new(paths.output_dir.join("timings.json")).render(&summary.report)?;
    Ok(())
}

/// Submits a guess. A storage failure leaves the round where it was and
/// yields `None` so the player can send the same guess again.
fn submit_or_keep(
    service: &GameService,
    session: &SessionId,
    guess: &str,
) -> Result<Option<GuessOutcome>, GameError> {
    match service.submit_guess(session, guess) {
        Ok(outcome) => Ok(Some(outcome)),
        Err(GameError::StorageWriteFailure(e)) => {
            warn!(error = %e, "Round not saved, waiting for a retry");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn print_report(report: &TimingReport) {
    println!("Response time per round:");
    for point in &report.per_entry {
        println!(
            "  {:>3}  {:<20} {:>7.2}s",
            point.position, point.image, point.elapsed_secs
        );
    }

    println!("Mean response time per blur level:");
    for group in &report.per_blur_level {
        println!(
            "  blur {:>3}  {:>7.2}s  ({} rounds)",
            group.blur_level, group.mean_elapsed_secs, group.samples
        );
    }
}

#[cfg(feature = "metrics")]
fn spawn_metrics_server(port: u16, metrics: Arc<GameMetrics>, ledger: Arc<dyn Ledger>) {
    use blur_recall::metrics::{MetricsServer, MetricsServerConfig};

    let server = MetricsServer::new(MetricsServerConfig::with_port(port), metrics, ledger);
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("Failed to start metrics runtime: {}", e);
                return;
            }
        };
        if let Err(e) = runtime.block_on(server.run()) {
            warn!("Metrics server stopped: {}", e);
        }
    });
}
