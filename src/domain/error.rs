//! Domain error types.

/// Top-level error type for gbce.
#[derive(Debug, thiserror::Error)]
pub enum GbceError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("no trades available for {symbol}")]
    NoTradesAvailable { symbol: String },

    #[error("arithmetic overflow while computing {operation}")]
    ArithmeticOverflow { operation: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GbceError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        GbceError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(operation: impl Into<String>) -> Self {
        GbceError::ArithmeticOverflow {
            operation: operation.into(),
        }
    }
}

impl From<&GbceError> for std::process::ExitCode {
    fn from(err: &GbceError) -> Self {
        let code: u8 = match err {
            GbceError::Io(_) => 1,
            GbceError::ConfigParse { .. }
            | GbceError::ConfigMissing { .. }
            | GbceError::ConfigInvalid { .. } => 2,
            GbceError::InvalidArgument { .. } | GbceError::ArithmeticOverflow { .. } => 3,
            GbceError::NoTradesAvailable { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            GbceError::invalid("price must be greater than 0").to_string(),
            "invalid argument: price must be greater than 0"
        );
        assert_eq!(
            GbceError::NoTradesAvailable {
                symbol: "TEA".into()
            }
            .to_string(),
            "no trades available for TEA"
        );
        assert_eq!(
            GbceError::ConfigMissing {
                section: "stock.tea".into(),
                key: "par_value".into()
            }
            .to_string(),
            "missing config key [stock.tea] par_value"
        );
    }
}
