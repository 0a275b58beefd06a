#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use gbce::domain::index::{SharedStock, share};
use gbce::domain::stock::Stock;
use gbce::domain::trade::TradeSide;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Write;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    now() - Duration::minutes(minutes)
}

pub fn common_stock() -> Stock {
    Stock::common("TEA", dec!(8), dec!(100)).unwrap()
}

pub fn preferred_stock() -> Stock {
    Stock::preferred("GIN", dec!(2), dec!(0.02), dec!(100)).unwrap()
}

pub fn shared_with_trade(stock: Stock, quantity: i64, price: Decimal) -> SharedStock {
    let shared = share(stock);
    shared
        .borrow_mut()
        .record_trade_at(now(), quantity, TradeSide::Buy, price)
        .unwrap();
    shared
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
