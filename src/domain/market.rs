//! Market setup: run mode, stock definitions and the sample session.
//!
//! Stocks come from `[stock.<symbol>]` sections listed, in registration
//! order, by `[exchange] symbols`. Without a symbol list the default GBCE
//! table is used.

use crate::domain::error::GbceError;
use crate::domain::index::{Gbce, share};
use crate::domain::stock::Stock;
use crate::domain::trade::TradeSide;
use crate::ports::config_port::ConfigPort;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

const EXCHANGE_SECTION: &str = "exchange";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Load the sample trades and report the metrics once.
    #[default]
    Preload,
    /// Drive the market from the text menu.
    Interactive,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "preload" => Ok(RunMode::Preload),
            "interactive" => Ok(RunMode::Interactive),
            other => Err(format!(
                "unknown mode '{other}' (expected preload or interactive)"
            )),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Preload => write!(f, "preload"),
            RunMode::Interactive => write!(f, "interactive"),
        }
    }
}

/// Stock type as configured. A preferred stock always carries its rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockType {
    Common,
    Preferred { fixed_dividend_rate: Decimal },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockDefinition {
    pub symbol: String,
    pub stock_type: StockType,
    pub last_dividend: Decimal,
    pub par_value: Decimal,
}

impl StockDefinition {
    pub fn build(&self) -> Result<Stock, GbceError> {
        match self.stock_type {
            StockType::Common => Stock::common(&self.symbol, self.last_dividend, self.par_value),
            StockType::Preferred {
                fixed_dividend_rate,
            } => Stock::preferred(
                &self.symbol,
                self.last_dividend,
                fixed_dividend_rate,
                self.par_value,
            ),
        }
    }
}

/// The reference stock table.
pub fn default_definitions() -> Vec<StockDefinition> {
    let common = |symbol: &str, last_dividend, par_value| StockDefinition {
        symbol: symbol.to_string(),
        stock_type: StockType::Common,
        last_dividend,
        par_value,
    };
    vec![
        common("TEA", dec!(0), dec!(100)),
        common("POP", dec!(8), dec!(100)),
        StockDefinition {
            symbol: "GIN".to_string(),
            stock_type: StockType::Preferred {
                fixed_dividend_rate: dec!(0.02),
            },
            last_dividend: dec!(8),
            par_value: dec!(100),
        },
        common("ALE", dec!(8), dec!(100)),
        common("JOE", dec!(13), dec!(250)),
    ]
}

/// Trades recorded by the preload session: (symbol, quantity, side, price).
pub fn sample_trades() -> Vec<(&'static str, i64, TradeSide, Decimal)> {
    vec![
        ("TEA", 100, TradeSide::Buy, dec!(105)),
        ("POP", 200, TradeSide::Sell, dec!(120)),
        ("GIN", 150, TradeSide::Buy, dec!(130)),
    ]
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, GbceError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let symbol = token.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(invalid(EXCHANGE_SECTION, "symbols", "empty symbol in list"));
        }
        if !seen.insert(symbol.clone()) {
            return Err(invalid(
                EXCHANGE_SECTION,
                "symbols",
                &format!("duplicate symbol {symbol}"),
            ));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

pub fn read_run_mode(config: &dyn ConfigPort) -> Result<RunMode, GbceError> {
    match config.get_trimmed(EXCHANGE_SECTION, "mode") {
        None => Ok(RunMode::default()),
        Some(s) => s
            .parse()
            .map_err(|reason: String| invalid(EXCHANGE_SECTION, "mode", &reason)),
    }
}

pub fn read_definitions(config: &dyn ConfigPort) -> Result<Vec<StockDefinition>, GbceError> {
    let Some(list) = config.get_trimmed(EXCHANGE_SECTION, "symbols") else {
        return Ok(default_definitions());
    };
    parse_symbols(&list)?
        .into_iter()
        .map(|symbol| read_definition(config, &symbol))
        .collect()
}

fn read_definition(config: &dyn ConfigPort, symbol: &str) -> Result<StockDefinition, GbceError> {
    let section = format!("stock.{}", symbol.to_lowercase());

    let stock_type = match config
        .get_trimmed(&section, "type")
        .map(|t| t.to_lowercase())
        .as_deref()
    {
        None | Some("common") => StockType::Common,
        Some("preferred") => StockType::Preferred {
            fixed_dividend_rate: read_fixed_dividend(config, &section)?,
        },
        Some(other) => {
            return Err(invalid(
                &section,
                "type",
                &format!("unknown stock type '{other}' (expected common or preferred)"),
            ));
        }
    };

    let last_dividend = required_decimal(config, &section, "last_dividend")?;
    let par_value = required_decimal(config, &section, "par_value")?;
    if last_dividend < Decimal::ZERO {
        return Err(invalid(&section, "last_dividend", "must be non-negative"));
    }
    if par_value < Decimal::ZERO {
        return Err(invalid(&section, "par_value", "must be non-negative"));
    }

    Ok(StockDefinition {
        symbol: symbol.to_string(),
        stock_type,
        last_dividend,
        par_value,
    })
}

fn read_fixed_dividend(config: &dyn ConfigPort, section: &str) -> Result<Decimal, GbceError> {
    let raw = config
        .get_trimmed(section, "fixed_dividend")
        .ok_or_else(|| GbceError::ConfigMissing {
            section: section.to_string(),
            key: "fixed_dividend".into(),
        })?;
    let rate = parse_rate(&raw)
        .ok_or_else(|| invalid(section, "fixed_dividend", "expected a rate such as 0.02 or 2%"))?;
    if rate < Decimal::ZERO {
        return Err(invalid(section, "fixed_dividend", "must be non-negative"));
    }
    Ok(rate)
}

fn required_decimal(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Decimal, GbceError> {
    let raw = config
        .get_trimmed(section, key)
        .ok_or_else(|| GbceError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })?;
    Decimal::from_str(&raw).map_err(|_| invalid(section, key, &format!("'{raw}' is not a decimal")))
}

/// "0.02" or "2%".
fn parse_rate(raw: &str) -> Option<Decimal> {
    match raw.strip_suffix('%') {
        Some(pct) => Decimal::from_str(pct.trim())
            .ok()
            .and_then(|v| v.checked_div(dec!(100))),
        None => Decimal::from_str(raw).ok(),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> GbceError {
    GbceError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Runs every market check without building anything.
pub fn validate_market_config(config: &dyn ConfigPort) -> Result<(), GbceError> {
    read_run_mode(config)?;
    read_definitions(config)?;
    Ok(())
}

/// Registers one stock per definition, in order.
pub fn build_market(definitions: &[StockDefinition]) -> Result<Gbce, GbceError> {
    let mut gbce = Gbce::new();
    for definition in definitions {
        gbce.add_stock(share(definition.build()?));
    }
    Ok(gbce)
}

/// Records the sample trades at `now`. Symbols missing from the market are skipped.
pub fn preload(gbce: &Gbce, now: DateTime<Utc>) -> Result<usize, GbceError> {
    let mut recorded = 0;
    for (symbol, quantity, side, price) in sample_trades() {
        match gbce.find(symbol) {
            Some(stock) => {
                stock.borrow_mut().record_trade_at(now, quantity, side, price)?;
                recorded += 1;
            }
            None => tracing::warn!(symbol, "sample trade skipped, stock not in market"),
        }
    }
    Ok(recorded)
}
