//! Market configuration read from an INI file.
//!
//! Section and key names are case-insensitive, so `[Stock.GIN]` and
//! `[stock.gin]` name the same stock.

use crate::domain::error::GbceError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

const STOCK_SECTION_PREFIX: &str = "stock.";

pub struct FileConfigAdapter {
    ini: Ini,
}

impl FileConfigAdapter {
    /// Loads `path`; unreadable or malformed files are `ConfigParse`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GbceError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| GbceError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        tracing::debug!(path = %path.display(), sections = ini.sections().len(), "config loaded");
        Ok(Self { ini })
    }

    pub fn from_string(content: &str) -> Result<Self, GbceError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| GbceError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self { ini })
    }

    /// Lower-case symbols of every `[stock.<symbol>]` section, sorted.
    pub fn stock_sections(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .ini
            .sections()
            .into_iter()
            .filter_map(|s| s.strip_prefix(STOCK_SECTION_PREFIX).map(str::to_string))
            .filter(|s| !s.is_empty())
            .collect();
        symbols.sort();
        symbols
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini.get(section, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MARKET: &str = r#"
[exchange]
mode = interactive
symbols = TEA, GIN

[stock.tea]
last_dividend = 0
par_value = 100

[stock.gin]
type = preferred
last_dividend = 8
fixed_dividend = 2%
par_value = 100
"#;

    fn market_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_exchange_and_stock_sections() {
        let adapter = FileConfigAdapter::from_string(MARKET).unwrap();
        assert_eq!(adapter.get_string("exchange", "mode").as_deref(), Some("interactive"));
        assert_eq!(adapter.get_string("stock.gin", "fixed_dividend").as_deref(), Some("2%"));
        assert_eq!(adapter.stock_sections(), vec!["gin", "tea"]);
    }

    #[test]
    fn stock_section_names_ignore_case() {
        let adapter =
            FileConfigAdapter::from_string("[Stock.TEA]\nPar_Value = 100\n[exchange]\n").unwrap();
        assert_eq!(adapter.get_string("stock.tea", "par_value").as_deref(), Some("100"));
        assert_eq!(adapter.stock_sections(), vec!["tea"]);
    }

    #[test]
    fn absent_keys_and_blank_values() {
        let adapter =
            FileConfigAdapter::from_string("[exchange]\nmode = preload\nsymbols =\n").unwrap();
        assert_eq!(adapter.get_string("exchange", "par_value"), None);
        assert_eq!(adapter.get_string("stock.joe", "par_value"), None);
        assert_eq!(adapter.get_trimmed("exchange", "symbols"), None);
    }

    #[test]
    fn market_file_on_disk() {
        let file = market_file(MARKET);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_trimmed("exchange", "symbols").as_deref(), Some("TEA, GIN"));
        assert_eq!(adapter.get_string("stock.tea", "par_value").as_deref(), Some("100"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = FileConfigAdapter::from_file("/nonexistent/path/gbce.ini").err().unwrap();
        match err {
            GbceError::ConfigParse { file, .. } => assert_eq!(file, "/nonexistent/path/gbce.ini"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
