mod config;
mod db;
mod import;
mod models;
mod report;
mod run;
mod schedule;
mod ui;

use anyhow::Result;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::load()?;
    config::init_logging(&config)?;
    tracing::info!(db = %config.db_path.display(), "starting installtui");

    let mut db = db::Database::open(&config.db_path)?;

    match args.len() {
        1 => run::as_tui(&config, &mut db),
        2.. => run::as_cli(&args, &config, &mut db),
        _ => {
            eprintln!("Usage: installtui [command]");
            Ok(())
        }
    }
}
