//! Interactive text menu over a [`Gbce`] market.
//!
//! Reads commands line by line; end of input behaves like `0`. Domain
//! failures and malformed input are reported as `error: ...` and the menu
//! keeps going.

use crate::domain::error::GbceError;
use crate::domain::index::{Gbce, SharedStock};
use crate::domain::trade::TradeSide;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::io::{BufRead, Write};
use std::str::FromStr;

const MENU: &str = "\
GBCE menu
  1) Record trade
  2) Dividend yield
  3) P/E ratio
  4) Volume weighted stock price
  5) GBCE All Share Index
  6) List stocks
  0) Exit";

pub struct ConsoleMenu<'a, R, W, C> {
    gbce: &'a Gbce,
    input: R,
    output: W,
    clock: C,
}

enum Outcome {
    Continue,
    Exit,
}

impl<'a, R, W, C> ConsoleMenu<'a, R, W, C>
where
    R: BufRead,
    W: Write,
    C: Fn() -> DateTime<Utc>,
{
    pub fn new(gbce: &'a Gbce, input: R, output: W, clock: C) -> Self {
        Self {
            gbce,
            input,
            output,
            clock,
        }
    }

    pub fn run(&mut self) -> Result<(), GbceError> {
        loop {
            writeln!(self.output, "{MENU}")?;
            let Some(choice) = self.prompt("> ")? else {
                break;
            };
            let outcome = match self.dispatch(&choice) {
                Ok(outcome) => outcome,
                Err(GbceError::Io(e)) => return Err(GbceError::Io(e)),
                Err(e) => {
                    writeln!(self.output, "error: {e}")?;
                    Outcome::Continue
                }
            };
            if let Outcome::Exit = outcome {
                break;
            }
        }
        writeln!(self.output, "Goodbye.")?;
        Ok(())
    }

    fn dispatch(&mut self, choice: &str) -> Result<Outcome, GbceError> {
        match choice {
            "1" => self.record_trade()?,
            "2" => self.dividend_yield()?,
            "3" => self.pe_ratio()?,
            "4" => self.vwsp()?,
            "5" => {
                let index = self.gbce.calculate_gbce_all_share_index((self.clock)())?;
                writeln!(self.output, "GBCE All Share Index: {index}")?;
            }
            "6" => self.list_stocks()?,
            "0" => return Ok(Outcome::Exit),
            other => writeln!(self.output, "error: unknown option '{other}'")?,
        }
        Ok(Outcome::Continue)
    }

    fn record_trade(&mut self) -> Result<(), GbceError> {
        let stock = self.select_stock()?;
        let quantity: i64 = self.read_value("Quantity: ")?;
        let side: TradeSide = self.read_value("Side (buy/sell): ")?;
        let price: Decimal = self.read_value("Price: ")?;
        let now = (self.clock)();
        stock.borrow_mut().record_trade_at(now, quantity, side, price)?;
        let symbol = stock.borrow().symbol().to_string();
        writeln!(self.output, "Recorded {symbol} trade: {side} {quantity} @ {price}")?;
        Ok(())
    }

    fn dividend_yield(&mut self) -> Result<(), GbceError> {
        let stock = self.select_stock()?;
        let price: Decimal = self.read_value("Price: ")?;
        let stock = stock.borrow();
        let dividend_yield = stock.calculate_dividend_yield(price)?;
        writeln!(
            self.output,
            "{} Dividend Yield (price={price}): {dividend_yield}",
            stock.symbol()
        )?;
        Ok(())
    }

    fn pe_ratio(&mut self) -> Result<(), GbceError> {
        let stock = self.select_stock()?;
        let price: Decimal = self.read_value("Price: ")?;
        let stock = stock.borrow();
        let pe = stock.calculate_pe_ratio(price)?;
        writeln!(self.output, "{} P/E Ratio (price={price}): {pe}", stock.symbol())?;
        Ok(())
    }

    fn vwsp(&mut self) -> Result<(), GbceError> {
        let stock = self.select_stock()?;
        let stock = stock.borrow();
        let vwsp = stock.calculate_volume_weighted_stock_price((self.clock)())?;
        writeln!(
            self.output,
            "{} Volume Weighted Stock Price: {vwsp}",
            stock.symbol()
        )?;
        Ok(())
    }

    fn list_stocks(&mut self) -> Result<(), GbceError> {
        for stock in self.gbce.stocks() {
            let stock = stock.borrow();
            writeln!(
                self.output,
                "  {:<6} {:<10} par={} last_dividend={} trades={}",
                stock.symbol(),
                stock.kind().label(),
                stock.par_value(),
                stock.last_dividend(),
                stock.trades().len()
            )?;
        }
        Ok(())
    }

    fn select_stock(&mut self) -> Result<SharedStock, GbceError> {
        let symbol = self.read_line("Symbol: ")?;
        self.gbce
            .find(&symbol)
            .ok_or_else(|| GbceError::invalid(format!("unknown stock symbol '{symbol}'")))
    }

    fn read_value<T>(&mut self, label: &str) -> Result<T, GbceError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.read_line(label)?;
        raw.parse()
            .map_err(|e: T::Err| GbceError::invalid(format!("'{raw}': {e}")))
    }

    fn read_line(&mut self, label: &str) -> Result<String, GbceError> {
        self.prompt(label)?
            .ok_or_else(|| GbceError::invalid("unexpected end of input"))
    }

    fn prompt(&mut self, label: &str) -> Result<Option<String>, GbceError> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::index::share;
    use crate::domain::stock::Stock;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn market() -> Gbce {
        let mut gbce = Gbce::new();
        gbce.add_stock(share(Stock::common("TEA", dec!(0), dec!(100)).unwrap()));
        gbce.add_stock(share(Stock::common("POP", dec!(8), dec!(100)).unwrap()));
        gbce
    }

    fn run_script(gbce: &Gbce, script: &str) -> String {
        let mut output = Vec::new();
        ConsoleMenu::new(gbce, Cursor::new(script.as_bytes()), &mut output, now)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn exit_immediately() {
        let out = run_script(&market(), "0\n");
        assert!(out.contains("GBCE menu"));
        assert!(out.ends_with("Goodbye.\n"));
    }

    #[test]
    fn end_of_input_exits() {
        let out = run_script(&market(), "");
        assert!(out.ends_with("Goodbye.\n"));
    }

    #[test]
    fn record_trade_then_vwsp_and_index() {
        let gbce = market();
        let out = run_script(&gbce, "1\npop\n200\nsell\n120\n4\nPOP\n5\n0\n");
        assert!(out.contains("Recorded POP trade: sell 200 @ 120"));
        assert!(out.contains("POP Volume Weighted Stock Price: 120"));
        assert!(out.contains("GBCE All Share Index: 120"));
        assert_eq!(gbce.find("POP").unwrap().borrow().trades().len(), 1);
    }

    #[test]
    fn pe_ratio_and_dividend_yield() {
        let out = run_script(&market(), "3\nPOP\n120\n3\nTEA\n100\n2\nPOP\n100\n0\n");
        assert!(out.contains("POP P/E Ratio (price=120): 15"));
        assert!(out.contains("TEA P/E Ratio (price=100): inf"));
        assert!(out.contains("POP Dividend Yield (price=100): 0.08"));
    }

    #[test]
    fn errors_are_reported_and_menu_continues() {
        let gbce = market();
        let out = run_script(&gbce, "4\nTEA\n1\nTEA\n0\nbuy\n10\n9\n3\nXYZ\n0\n");
        assert!(out.contains("error: no trades available for TEA"));
        assert!(out.contains("error: invalid argument: quantity and price must be greater than 0"));
        assert!(out.contains("error: unknown option '9'"));
        assert!(out.contains("error: invalid argument: unknown stock symbol 'XYZ'"));
        assert!(gbce.find("TEA").unwrap().borrow().trades().is_empty());
    }

    #[test]
    fn malformed_number_is_reported() {
        let out = run_script(&market(), "2\nTEA\nabc\n0\n");
        assert!(out.contains("error: invalid argument: 'abc'"));
    }

    #[test]
    fn list_stocks_shows_table() {
        let out = run_script(&market(), "6\n0\n");
        assert!(out.contains("TEA"));
        assert!(out.contains("common"));
        assert!(out.contains("trades=0"));
    }
}
