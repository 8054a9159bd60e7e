use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;

use tygia::cli::{Cli, Commands, SourceKind};
use tygia::config::Config;
use tygia::error::RateError;
use tygia::fetch::api::ApiSource;
use tygia::fetch::scrape::ScrapeSource;
use tygia::fetch::RateSource;
use tygia::rates::RateQuote;
use tygia::server;
use tygia::service::RateService;
use tygia::store::SnapshotStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = Some(dir);
    }

    match cli.command {
        Commands::Crawl { source } => handle_crawl(&config, source, cli.json).await,
        Commands::List => handle_list(&config, cli.json),
        Commands::Get { code } => handle_get(&config, &code, cli.json),
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            let service = Arc::new(build_service(&config, SourceKind::Api)?);
            server::serve(service, &bind).await
        }
    }
}

fn build_service(config: &Config, source: SourceKind) -> Result<RateService> {
    let store = SnapshotStore::new(config.snapshot_path()?);
    let source: Box<dyn RateSource> = match source {
        SourceKind::Api => Box::new(ApiSource::new(&config.api_url)),
        SourceKind::Scrape => Box::new(ScrapeSource::new(&config.scrape_url)),
    };
    Ok(RateService::new(store, source))
}

async fn handle_crawl(config: &Config, source: SourceKind, json: bool) -> Result<()> {
    let service = build_service(config, source)?;
    let quotes = service.refresh().await?;

    print_quotes(&quotes, json)?;
    if !json {
        println!(
            "\n{} Saved {} rates to {}",
            "✓".green().bold(),
            quotes.len(),
            config.snapshot_path()?.display()
        );
    }
    Ok(())
}

fn handle_list(config: &Config, json: bool) -> Result<()> {
    let service = build_service(config, SourceKind::Api)?;
    let quotes = service.list()?;

    if quotes.is_empty() && !json {
        println!("No rates cached yet. Run `tygia crawl` first.");
        return Ok(());
    }
    print_quotes(&quotes, json)
}

fn handle_get(config: &Config, code: &str, json: bool) -> Result<()> {
    let service = build_service(config, SourceKind::Api)?;
    match service.lookup(code)? {
        Some(rate) => {
            if json {
                println!("{}", serde_json::json!({ "rate": rate }));
            } else {
                println!("{code}: {rate:.2}");
            }
            Ok(())
        }
        None => bail!(RateError::NotFound(code.to_string())),
    }
}

fn print_quotes(quotes: &[RateQuote], json: bool) -> Result<()> {
    use tabled::{settings::Style, Table, Tabled};

    if json {
        println!("{}", serde_json::to_string_pretty(quotes)?);
        return Ok(());
    }

    #[derive(Tabled)]
    struct RateRow {
        #[tabled(rename = "Code")]
        code: String,
        #[tabled(rename = "Currency")]
        name: String,
        #[tabled(rename = "Sell (VND)")]
        rate: String,
    }

    let rows: Vec<RateRow> = quotes
        .iter()
        .map(|q| RateRow {
            code: q.code.clone(),
            name: q.name.clone(),
            rate: format!("{:.2}", q.rate),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}
