mod auth;
mod db;
mod error;
mod models;
mod report;
mod session;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    let db_path = get_db_path()?;
    let db = db::Database::open(&db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut session = session::Session::new(&db, stdin.lock(), stdout.lock());
    session.run().context("Session ended with an error")?;
    Ok(())
}

fn get_db_path() -> Result<std::path::PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "pocketbook", "Pocketbook")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("pocketbook.db"))
}
