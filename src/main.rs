use clap::Parser;
use flowchart_tree::cli::{Args, run};
use log::{LevelFilter, error, info};
use std::{process, str::FromStr};

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", args.log_level);
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting flowtree");

    if let Err(err) = run(&args) {
        error!(err:% = err; "Run failed");
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}
