mod cli;
mod compose;
mod error;
mod paths;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::compose::CANVAS_SIZE;

const LOG_ENV_VAR: &str = "CLAUDE_ICON_GEN_LOG";

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    let output = args.output_path();
    let source = args.source_path();

    match compose::generate_icon(&source, &output) {
        Ok(layout) => {
            let (w, h) = layout.pixel_size();
            println!("Icon generated: {w}x{h} clawd on {CANVAS_SIZE}x{CANVAS_SIZE} canvas");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
