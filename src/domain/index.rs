//! GBCE All Share Index service.

use crate::domain::error::GbceError;
use crate::domain::geometric::geometric_mean;
use crate::domain::stock::Stock;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::rc::Rc;

/// Stocks are registered by shared handle so trades recorded after
/// registration are seen by the index.
pub type SharedStock = Rc<RefCell<Stock>>;

pub fn share(stock: Stock) -> SharedStock {
    Rc::new(RefCell::new(stock))
}

#[derive(Debug, Default)]
pub struct Gbce {
    stocks: Vec<SharedStock>,
}

impl Gbce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `stock`. The same handle may be registered more than once.
    pub fn add_stock(&mut self, stock: SharedStock) {
        tracing::debug!(symbol = %stock.borrow().symbol(), "registered stock");
        self.stocks.push(stock);
    }

    /// Registered stocks in registration order.
    pub fn stocks(&self) -> &[SharedStock] {
        &self.stocks
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    /// First registered stock with `symbol`, ignoring case.
    pub fn find(&self, symbol: &str) -> Option<SharedStock> {
        let wanted = symbol.trim().to_uppercase();
        self.stocks
            .iter()
            .find(|s| s.borrow().symbol() == wanted)
            .cloned()
    }

    /// Geometric mean of the VWSP of every stock that has traded.
    ///
    /// Untraded stocks are left out; with no traded stock at all the index is 0.
    pub fn calculate_gbce_all_share_index(&self, now: DateTime<Utc>) -> Result<Decimal, GbceError> {
        let mut vwsp_values = Vec::with_capacity(self.stocks.len());
        let mut skipped = 0usize;

        for stock in &self.stocks {
            let stock = stock.borrow();
            if !stock.has_trades() {
                skipped += 1;
                continue;
            }
            vwsp_values.push(stock.calculate_volume_weighted_stock_price(now)?);
        }

        if skipped > 0 {
            tracing::warn!(skipped, "stocks without trades left out of the index");
        }
        if vwsp_values.is_empty() {
            return Ok(Decimal::ZERO);
        }
        geometric_mean(&vwsp_values)
    }
}
