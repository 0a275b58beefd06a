//! Dividend policies for the two stock kinds.
//!
//! A stock that pays nothing is a common stock with a zero last dividend.

use crate::domain::error::GbceError;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockKind {
    Common {
        last_dividend: Decimal,
    },
    Preferred {
        last_dividend: Decimal,
        /// Fraction of par paid per period, e.g. 0.02 for 2%.
        fixed_dividend_rate: Decimal,
    },
}

impl StockKind {
    pub fn last_dividend(&self) -> Decimal {
        match self {
            StockKind::Common { last_dividend } | StockKind::Preferred { last_dividend, .. } => {
                *last_dividend
            }
        }
    }

    pub fn dividend_yield(&self, par_value: Decimal, price: Decimal) -> Result<Decimal, GbceError> {
        match self {
            StockKind::Common { last_dividend } => common_dividend_yield(*last_dividend, price),
            StockKind::Preferred {
                fixed_dividend_rate,
                ..
            } => preferred_dividend_yield(*fixed_dividend_rate, par_value, price),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockKind::Common { .. } => "common",
            StockKind::Preferred { .. } => "preferred",
        }
    }
}

/// last_dividend / price, or 0 for a non-positive price.
///
/// A quotient outside the decimal range is `ArithmeticOverflow`; zero is
/// reserved for the non-positive price case.
pub fn common_dividend_yield(last_dividend: Decimal, price: Decimal) -> Result<Decimal, GbceError> {
    if price <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    last_dividend
        .checked_div(price)
        .ok_or_else(|| GbceError::overflow("dividend yield"))
}

/// (fixed_dividend_rate * par_value) / price, or 0 for a non-positive price.
pub fn preferred_dividend_yield(
    fixed_dividend_rate: Decimal,
    par_value: Decimal,
    price: Decimal,
) -> Result<Decimal, GbceError> {
    if price <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    fixed_dividend_rate
        .checked_mul(par_value)
        .and_then(|annual| annual.checked_div(price))
        .ok_or_else(|| GbceError::overflow("dividend yield"))
}
