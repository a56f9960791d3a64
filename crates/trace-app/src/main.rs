//! Native entry point: plays one round headlessly and prints the result.

#[cfg(feature = "native")]
fn main() -> std::process::ExitCode {
    use std::process::ExitCode;
    use trace_app::{AppConfig, autoplay};

    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(&path),
        None => Ok(AppConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!("Starting {}", config.title);

    let report = match autoplay::play(&config) {
        Ok(report) => report,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    print!("{}", report.board);
    match &report.summary {
        Some(summary) => {
            println!("Total time: {}", summary.total_time_label());
            match serde_json::to_string_pretty(summary) {
                Ok(json) => println!("{}", json),
                Err(e) => log::error!("Failed to serialize summary: {}", e),
            }
            ExitCode::SUCCESS
        }
        None => {
            println!("Round stuck after {} segments", report.segments);
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    eprintln!("Native feature not enabled. Use `cargo run --features native`");
}
