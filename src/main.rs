use clap::Parser;
use log::{error, LevelFilter};

mod args;
mod dashboard;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    if let Err(e) = dashboard::run_dashboard_cli(&args) {
        error!("{:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
