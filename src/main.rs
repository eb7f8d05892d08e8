use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use log::debug;

fn run(path: &str) -> Result<()> {
    let source =
        fs::read_to_string(path).with_context(|| format!("ERROR: File '{path}' could not be read"))?;
    debug!("read {} bytes from {path}", source.len());
    ulang::run_source(&source)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("ULANG_LOG", "warn"))
        .format_timestamp(None)
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(path), None) = (args.next(), args.next()) else {
        eprintln!("Usage: ulang <script.ul>");
        return ExitCode::from(2);
    };

    match run(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}
