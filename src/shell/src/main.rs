use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env, Target};
use epd_config_ui::{
    cli::{self, Cli},
    config::AppConfig,
};
use log::{error, info};
use std::io::Write;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("application error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    initialize();

    let config = AppConfig::load().context("failed to load configuration")?;

    cli::run(cli, config).await
}

fn initialize() {
    log_panics::init();

    let mut builder = if cfg!(debug_assertions) {
        Builder::from_env(Env::default().default_filter_or("debug"))
    } else {
        Builder::from_env(Env::default().default_filter_or("info"))
    };

    builder.format(|f, record| match record.level() {
        log::Level::Error => {
            eprintln!("{}", record.args());
            Ok(())
        }
        _ => {
            writeln!(f, "{}", record.args())
        }
    });

    builder.target(Target::Stderr).init();

    info!("module version: {}", env!("CARGO_PKG_VERSION"));
}
