//! Logging initialization for the demo binary.
//!
//! File output goes to `./sifter.log` in the current working directory.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILE: &str = "./sifter.log";
const LEVEL: LevelFilter = LevelFilter::Info;

/// Destination for log output.
#[allow(dead_code)]
pub enum LogDestination {
    /// Write to ./sifter.log in current directory.
    File,
    /// Write to terminal (stderr for warnings and errors).
    Terminal,
    /// Write to both file and terminal.
    Both,
}

/// Initialize the global logger with the specified destination.
pub fn initialize(destination: LogDestination) {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if matches!(destination, LogDestination::Terminal | LogDestination::Both) {
        loggers.push(TermLogger::new(
            LEVEL,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if matches!(destination, LogDestination::File | LogDestination::Both) {
        match File::create(Path::new(LOG_FILE)) {
            Ok(file) => loggers.push(WriteLogger::new(LEVEL, config, file)),
            Err(err) => eprintln!("Warning: could not create {}: {}", LOG_FILE, err),
        }
    }

    let _ = CombinedLogger::init(loggers);
}
