//! CLI definition and dispatch.

use chrono::Utc;
use clap::{Parser, Subcommand};
use rust_decimal_macros::dec;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::console_menu::ConsoleMenu;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::GbceError;
use crate::domain::index::Gbce;
use crate::domain::market::{
    self, RunMode, StockDefinition, build_market, read_definitions, read_run_mode,
    validate_market_config,
};
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "gbce", about = "Global Beverage Corporation Exchange stock index")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the market and run it
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// preload or interactive; overrides [exchange] mode
        #[arg(long, value_parser = parse_mode)]
        mode: Option<RunMode>,
    },
    /// Validate a market configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn parse_mode(s: &str) -> Result<RunMode, String> {
    s.parse()
}

/// Everything the run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub mode: RunMode,
    pub stocks: Vec<StockDefinition>,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run { config, mode } => {
            resolve_settings(config.as_ref(), mode).and_then(|settings| run_market(&settings))
        }
        Command::Validate { config } => run_validate(&config),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, GbceError> {
    FileConfigAdapter::from_file(path)
}

/// Mode precedence: command line, then `[exchange] mode`, then preload.
pub fn resolve_settings(
    config_path: Option<&PathBuf>,
    mode_override: Option<RunMode>,
) -> Result<RunSettings, GbceError> {
    let adapter = match config_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            Some(load_config(path)?)
        }
        None => None,
    };
    settings_from(adapter.as_ref().map(|a| a as &dyn ConfigPort), mode_override)
}

pub fn settings_from(
    config: Option<&dyn ConfigPort>,
    mode_override: Option<RunMode>,
) -> Result<RunSettings, GbceError> {
    let (configured_mode, stocks) = match config {
        Some(config) => (read_run_mode(config)?, read_definitions(config)?),
        None => (RunMode::default(), market::default_definitions()),
    };
    Ok(RunSettings {
        mode: mode_override.unwrap_or(configured_mode),
        stocks,
    })
}

fn run_market(settings: &RunSettings) -> Result<(), GbceError> {
    let gbce = build_market(&settings.stocks)?;
    tracing::info!(mode = %settings.mode, stocks = gbce.len(), "market ready");

    match settings.mode {
        RunMode::Preload => run_preload(&gbce, &mut io::stdout().lock()),
        RunMode::Interactive => {
            let stdin = io::stdin();
            let mut menu = ConsoleMenu::new(&gbce, stdin.lock(), io::stdout().lock(), Utc::now);
            menu.run()
        }
    }
}

/// Records the sample trades and reports the reference metrics and a
/// per-stock summary.
pub fn run_preload<W: Write>(gbce: &Gbce, out: &mut W) -> Result<(), GbceError> {
    let now = Utc::now();
    market::preload(gbce, now)?;

    let mut report = Vec::new();
    if let Some(tea) = gbce.find("TEA") {
        let dividend_yield = tea.borrow().calculate_dividend_yield(dec!(105))?;
        report.push(format!("TEA Dividend Yield (price=105): {dividend_yield}"));
    }
    if let Some(pop) = gbce.find("POP") {
        let pe = pop.borrow().calculate_pe_ratio(dec!(120))?;
        report.push(format!("POP P/E Ratio (price=120): {pe}"));
    }
    if let Some(gin) = gbce.find("GIN") {
        let vwsp = gin.borrow().calculate_volume_weighted_stock_price(now)?;
        report.push(format!("GIN Volume Weighted Stock Price: {vwsp}"));
    }
    let index = gbce.calculate_gbce_all_share_index(now)?;
    report.push(format!("GBCE All Share Index: {index}"));

    for line in &report {
        tracing::info!("{line}");
        writeln!(out, "{line}")?;
    }
    writeln!(out)?;
    write_summary(gbce, now, out)?;
    Ok(())
}

/// One row per stock; metrics are evaluated at the last traded price.
pub fn write_summary<W: Write>(
    gbce: &Gbce,
    now: chrono::DateTime<Utc>,
    out: &mut W,
) -> Result<(), GbceError> {
    writeln!(
        out,
        "{:<6} {:<10} {:>8} {:>14} {:>10} {:>10}",
        "Symbol", "Type", "Trades", "Dividend Yield", "P/E", "VWSP"
    )?;
    for stock in gbce.stocks() {
        let stock = stock.borrow();
        let (dividend_yield, pe, vwsp) = match stock.trades().last() {
            Some(last) => (
                stock.calculate_dividend_yield(last.price())?.round_dp(4).to_string(),
                stock.calculate_pe_ratio(last.price())?.to_string(),
                stock
                    .calculate_volume_weighted_stock_price(now)?
                    .round_dp(4)
                    .to_string(),
            ),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };
        writeln!(
            out,
            "{:<6} {:<10} {:>8} {:>14} {:>10} {:>10}",
            stock.symbol(),
            stock.kind().label(),
            stock.trades().len(),
            dividend_yield,
            pe,
            vwsp
        )?;
    }
    Ok(())
}

fn run_validate(config_path: &PathBuf) -> Result<(), GbceError> {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = load_config(config_path)?;
    validate_market_config(&adapter)?;

    let settings = settings_from(Some(&adapter as &dyn ConfigPort), None)?;
    for unused in unlisted_stock_sections(&adapter, &settings) {
        eprintln!("warning: [stock.{unused}] is not listed in [exchange] symbols");
    }
    eprintln!("\nMode: {}", settings.mode);
    eprintln!("Stocks:");
    for definition in &settings.stocks {
        let stock = definition.build()?;
        eprintln!(
            "  {} ({}) par={} last_dividend={}",
            stock.symbol(),
            stock.kind().label(),
            stock.par_value(),
            stock.last_dividend()
        );
    }

    eprintln!("\nMarket configuration is valid.");
    Ok(())
}

/// Stock sections present in the file that no configured symbol refers to.
pub fn unlisted_stock_sections(adapter: &FileConfigAdapter, settings: &RunSettings) -> Vec<String> {
    adapter
        .stock_sections()
        .into_iter()
        .filter(|section| {
            !settings
                .stocks
                .iter()
                .any(|stock| stock.symbol.eq_ignore_ascii_case(section))
        })
        .collect()
}
