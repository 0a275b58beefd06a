//! Trade records.

use crate::domain::error::GbceError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for TradeSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" | "b" => Ok(TradeSide::Buy),
            "sell" | "s" => Ok(TradeSide::Sell),
            other => Err(format!("unknown trade side '{other}' (expected buy or sell)")),
        }
    }
}

/// A single executed trade. Immutable once constructed.
///
/// The side is carried for reporting only; no metric depends on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    timestamp: DateTime<Utc>,
    quantity: i64,
    side: TradeSide,
    price: Decimal,
}

impl Trade {
    /// Fails with `InvalidArgument` unless both quantity and price are positive.
    pub fn new(
        timestamp: DateTime<Utc>,
        quantity: i64,
        side: TradeSide,
        price: Decimal,
    ) -> Result<Self, GbceError> {
        if quantity <= 0 || price <= Decimal::ZERO {
            return Err(GbceError::invalid(
                "quantity and price must be greater than 0",
            ));
        }
        Ok(Self {
            timestamp,
            quantity,
            side,
            price,
        })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn side(&self) -> TradeSide {
        self.side
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    /// price * quantity, `None` on overflow.
    pub fn value(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn new_keeps_fields() {
        let trade = Trade::new(ts(), 100, TradeSide::Buy, dec!(105.5)).unwrap();
        assert_eq!(trade.timestamp(), ts());
        assert_eq!(trade.quantity(), 100);
        assert_eq!(trade.side(), TradeSide::Buy);
        assert_eq!(trade.price(), dec!(105.5));
    }

    #[test]
    fn new_rejects_non_positive_quantity() {
        assert!(matches!(
            Trade::new(ts(), 0, TradeSide::Buy, dec!(10)),
            Err(GbceError::InvalidArgument { .. })
        ));
        assert!(matches!(
            Trade::new(ts(), -5, TradeSide::Sell, dec!(10)),
            Err(GbceError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn new_rejects_non_positive_price() {
        assert!(matches!(
            Trade::new(ts(), 10, TradeSide::Buy, Decimal::ZERO),
            Err(GbceError::InvalidArgument { .. })
        ));
        assert!(matches!(
            Trade::new(ts(), 10, TradeSide::Buy, dec!(-1)),
            Err(GbceError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn value_is_price_times_quantity() {
        let trade = Trade::new(ts(), 150, TradeSide::Sell, dec!(110)).unwrap();
        assert_eq!(trade.value(), Some(dec!(16500)));
    }

    #[test]
    fn side_parse_and_display() {
        assert_eq!("BUY".parse::<TradeSide>().unwrap(), TradeSide::Buy);
        assert_eq!(" s ".parse::<TradeSide>().unwrap(), TradeSide::Sell);
        assert!("hold".parse::<TradeSide>().is_err());
        assert_eq!(TradeSide::Sell.to_string(), "sell");
    }
}
