//! Worker-pool CLI driver (spec §5, §7).
//!
//! `J` worker threads each pull an image path from a shared queue, run the
//! coarse-to-fine detector independently, and serialize only on the
//! standard-output print — the lock's critical section never covers
//! detection work. A failed image is reported as a single sentinel line and
//! does not stop the run.

mod logging;

use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use log::LevelFilter;

use chess_corners::{find_chess_corners_image, ChessConfig};

/// Detect ChESS chessboard corners in a list of images.
#[derive(Parser, Debug)]
#[command(name = "chess-corners", version, about)]
struct Cli {
    /// Image files to process.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Worker thread count.
    #[arg(short = 'j', long, default_value_t = default_jobs())]
    jobs: usize,

    /// Use the legacy (R=5) parameter preset instead of the refinement-era
    /// defaults.
    #[arg(long)]
    legacy: bool,

    /// Run the tracker once at level 0 instead of the full coarse-to-fine
    /// pyramid protocol.
    #[arg(long)]
    single_scale: bool,

    /// Increase logging verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn default_jobs() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

fn config_for(cli: &Cli) -> ChessConfig {
    let mut config = if cli.single_scale {
        ChessConfig::single_scale()
    } else {
        ChessConfig::coarse_to_fine()
    };
    if cli.legacy {
        config.params = chess_corners::ChessParams::legacy();
    }
    config
}

fn process_one(path: &PathBuf, config: &ChessConfig, stdout: &Mutex<io::Stdout>) {
    let result = image::open(path).map(|img| img.to_luma8()).map_err(|e| e.to_string()).and_then(|gray| {
        find_chess_corners_image(&gray, config).map_err(|e| e.to_string())
    });

    let guard = stdout.lock().unwrap_or_else(|e| e.into_inner());
    let mut out = guard;
    match result {
        Ok(corners) => {
            let _ = writeln!(out, "{} {}", path.display(), corners.len());
            for c in &corners {
                let _ = writeln!(out, "{} {}", c.x, c.y);
            }
        }
        Err(reason) => {
            log::warn!("{}: {reason}", path.display());
            let _ = writeln!(out, "{} - - -", path.display());
        }
    }
}

fn main() {
    let cli = Cli::parse();
    #[cfg(feature = "tracing")]
    logging::init_tracing(false);
    #[cfg(not(feature = "tracing"))]
    let _ = logging::init_with_level(level_filter(cli.verbose));

    let config = config_for(&cli);
    let queue = Arc::new(Mutex::new(VecDeque::from(cli.images.clone())));
    let stdout = Arc::new(Mutex::new(io::stdout()));
    let jobs = cli.jobs.max(1).min(cli.images.len().max(1));

    std::thread::scope(|scope| {
        for _ in 0..jobs {
            let queue = Arc::clone(&queue);
            let stdout = Arc::clone(&stdout);
            let config = config.clone();
            scope.spawn(move || loop {
                let next = queue.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
                match next {
                    Some(path) => process_one(&path, &config, &stdout),
                    None => break,
                }
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_jobs_is_at_least_one() {
        assert!(default_jobs() >= 1);
    }

    #[test]
    fn verbosity_maps_to_increasing_log_levels() {
        assert_eq!(level_filter(0), LevelFilter::Warn);
        assert_eq!(level_filter(1), LevelFilter::Info);
        assert_eq!(level_filter(5), LevelFilter::Debug);
    }
}
