use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;

use liga_terminal::config::{Settings, parse_list};
use liga_terminal::season_fetch::{BASE_URL, FetchStatus, SeasonFetcher};

/// Download football-data.co.uk season files into the data directory.
#[derive(Parser, Debug)]
#[command(name = "season_fetch")]
struct Cli {
    /// Season code, e.g. 2526 for 2025/26
    #[arg(long, env = "LIGA_SEASON_CODE")]
    season: Option<String>,

    /// Comma-separated division codes
    #[arg(long)]
    divisions: Option<String>,

    /// Target directory (defaults to the configured data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Mirror of the provider's season tree
    #[arg(long, env = "LIGA_FETCH_BASE_URL", default_value = BASE_URL)]
    base_url: String,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    let season = cli.season.unwrap_or(settings.season_code);
    let divisions = cli
        .divisions
        .as_deref()
        .map(parse_list)
        .unwrap_or(settings.divisions);
    if divisions.is_empty() {
        return Err(anyhow!("no divisions to fetch"));
    }
    let data_dir = cli.data_dir.unwrap_or(settings.data_dir);

    let mut fetcher = SeasonFetcher::new(&data_dir).base_url(cli.base_url);
    let summary = fetcher.fetch_all(&season, &divisions)?;

    println!("Season fetch {season} -> {}", data_dir.display());
    for (division, status) in &summary.fetched {
        match status {
            FetchStatus::Downloaded { bytes, matches } => {
                println!("  {division}: downloaded {bytes} bytes, {matches} matches")
            }
            FetchStatus::NotModified => println!("  {division}: up to date"),
        }
    }
    for (division, err) in &summary.failed {
        println!("  {division}: failed - {err}");
    }

    if summary.is_ok() {
        Ok(())
    } else {
        Err(anyhow!(
            "{} of {} divisions failed",
            summary.failed.len(),
            divisions.len()
        ))
    }
}
