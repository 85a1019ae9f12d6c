use clap::Parser;
use colored::Colorize;
use once_cell::sync::Lazy;

use sssp_harness::Cli;

static CMD_ARGS: Lazy<Cli> = Lazy::new(|| {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    Cli::parse()
});

fn main() {
    let args = &*CMD_ARGS;
    env_logger::init();
    if let Err(err) = sssp_harness::entry(args) {
        eprintln!("❌ {}: {}", "ERROR".red().bold(), format!("{:#}", err).red());
        std::process::exit(1);
    }
}
