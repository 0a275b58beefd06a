//! Stocks, their trade history and the per-stock metrics.

use crate::domain::dividend::StockKind;
use crate::domain::error::GbceError;
use crate::domain::trade::{Trade, TradeSide};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::fmt;

/// Trailing window, in minutes, that VWSP looks back over.
pub const VWSP_WINDOW_MINUTES: i64 = 5;

/// Price/earnings ratio. `Infinite` when the last dividend is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeRatio {
    Finite(Decimal),
    Infinite,
}

impl PeRatio {
    pub fn is_infinite(&self) -> bool {
        matches!(self, PeRatio::Infinite)
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            PeRatio::Finite(v) => Some(*v),
            PeRatio::Infinite => None,
        }
    }
}

impl fmt::Display for PeRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeRatio::Finite(v) => write!(f, "{v}"),
            PeRatio::Infinite => write!(f, "inf"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Stock {
    symbol: String,
    par_value: Decimal,
    kind: StockKind,
    trades: Vec<Trade>,
}

impl Stock {
    pub fn common(symbol: &str, last_dividend: Decimal, par_value: Decimal) -> Result<Self, GbceError> {
        Self::new(symbol, par_value, StockKind::Common { last_dividend })
    }

    pub fn preferred(
        symbol: &str,
        last_dividend: Decimal,
        fixed_dividend_rate: Decimal,
        par_value: Decimal,
    ) -> Result<Self, GbceError> {
        if fixed_dividend_rate < Decimal::ZERO {
            return Err(GbceError::invalid("fixed dividend rate must not be negative"));
        }
        Self::new(
            symbol,
            par_value,
            StockKind::Preferred {
                last_dividend,
                fixed_dividend_rate,
            },
        )
    }

    pub fn new(symbol: &str, par_value: Decimal, kind: StockKind) -> Result<Self, GbceError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(GbceError::invalid("symbol must not be empty"));
        }
        if par_value < Decimal::ZERO {
            return Err(GbceError::invalid("par value must not be negative"));
        }
        if kind.last_dividend() < Decimal::ZERO {
            return Err(GbceError::invalid("last dividend must not be negative"));
        }
        Ok(Self {
            symbol,
            par_value,
            kind,
            trades: Vec::new(),
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn par_value(&self) -> Decimal {
        self.par_value
    }

    pub fn kind(&self) -> &StockKind {
        &self.kind
    }

    pub fn last_dividend(&self) -> Decimal {
        self.kind.last_dividend()
    }

    /// Trades in recording order.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn has_trades(&self) -> bool {
        !self.trades.is_empty()
    }

    /// Records a trade stamped with the current wall-clock time.
    pub fn record_trade(
        &mut self,
        quantity: i64,
        side: TradeSide,
        price: Decimal,
    ) -> Result<(), GbceError> {
        self.record_trade_at(Utc::now(), quantity, side, price)
    }

    pub fn record_trade_at(
        &mut self,
        timestamp: DateTime<Utc>,
        quantity: i64,
        side: TradeSide,
        price: Decimal,
    ) -> Result<(), GbceError> {
        let trade = Trade::new(timestamp, quantity, side, price)?;
        self.trades.push(trade);
        tracing::info!(
            symbol = %self.symbol,
            %side,
            quantity,
            %price,
            "recorded trade"
        );
        Ok(())
    }

    /// Non-positive prices yield 0 rather than an error.
    pub fn calculate_dividend_yield(&self, price: Decimal) -> Result<Decimal, GbceError> {
        self.kind.dividend_yield(self.par_value, price)
    }

    pub fn calculate_pe_ratio(&self, price: Decimal) -> Result<PeRatio, GbceError> {
        if price <= Decimal::ZERO {
            return Err(GbceError::invalid("price must be greater than 0"));
        }
        let last_dividend = self.last_dividend();
        if last_dividend <= Decimal::ZERO {
            return Ok(PeRatio::Infinite);
        }
        price
            .checked_div(last_dividend)
            .map(PeRatio::Finite)
            .ok_or_else(|| GbceError::overflow("P/E ratio"))
    }

    /// Volume weighted price over trades with `now - timestamp <= 5 minutes`.
    ///
    /// Returns 0 when no trade falls inside the window.
    pub fn calculate_volume_weighted_stock_price(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Decimal, GbceError> {
        if self.trades.is_empty() {
            return Err(GbceError::NoTradesAvailable {
                symbol: self.symbol.clone(),
            });
        }

        let window = Duration::minutes(VWSP_WINDOW_MINUTES);
        let mut total_value = Decimal::ZERO;
        let mut total_quantity = Decimal::ZERO;
        let mut counted = 0usize;

        for trade in self
            .trades
            .iter()
            .filter(|t| now.signed_duration_since(t.timestamp()) <= window)
        {
            let value = trade
                .value()
                .and_then(|v| total_value.checked_add(v))
                .ok_or_else(|| GbceError::overflow("volume weighted stock price"))?;
            total_value = value;
            total_quantity = total_quantity
                .checked_add(Decimal::from(trade.quantity()))
                .ok_or_else(|| GbceError::overflow("volume weighted stock price"))?;
            counted += 1;
        }

        tracing::debug!(
            symbol = %self.symbol,
            counted,
            total = self.trades.len(),
            "vwsp window"
        );

        if total_quantity <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        total_value
            .checked_div(total_quantity)
            .ok_or_else(|| GbceError::overflow("volume weighted stock price"))
    }
}
